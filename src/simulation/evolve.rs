//! Per-frame time evolution pass.
//!
//! Reads the packed spectrum and produces the dispersed spectrum at time t,
//! with the height spectrum in RG and the choppy displacement spectrum in
//! BA so both ride through the same FFT passes.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::gpu::{GpuContext, SimTexture, SIM_TEXTURE_FORMAT};
use crate::params::SimulationParams;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct EvolveUniforms {
    size: u32,
    scale: f32,
    chopping: f32,
    time: f32,
}

pub struct EvolvePass {
    pipeline: wgpu::ComputePipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    n: u32,
    scale: f32,
    chopping: f32,
}

impl EvolvePass {
    pub fn new(
        gpu: &GpuContext,
        params: &SimulationParams,
        packed_spectrum: &SimTexture,
        output: &SimTexture,
    ) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Time Evolution Shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../shaders/time_evolution.wgsl").into(),
            ),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Time Evolution Uniforms"),
            contents: bytemuck::cast_slice(&[EvolveUniforms {
                size: params.modes,
                scale: params.scale,
                chopping: params.chopping,
                time: 0.0,
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Time Evolution Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: SIM_TEXTURE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Time Evolution Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&packed_spectrum.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&output.view),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Time Evolution Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Time Evolution Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            n: params.modes,
            scale: params.scale,
            chopping: params.chopping,
        }
    }

    /// Pick up changed scale or chopping values. The uniform buffer itself
    /// is rewritten on every encode since time changes each frame.
    pub fn set_params(&mut self, params: &SimulationParams) {
        debug_assert_eq!(params.modes, self.n);
        self.scale = params.scale;
        self.chopping = params.chopping;
    }

    /// Encode one evolution pass for simulation time `t`.
    pub fn encode(&self, gpu: &GpuContext, encoder: &mut wgpu::CommandEncoder, t: f32) {
        gpu.queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[EvolveUniforms {
                size: self.n,
                scale: self.scale,
                chopping: self.chopping,
                time: t,
            }]),
        );

        let workgroups = self.n.div_ceil(8);
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Time Evolution Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.dispatch_workgroups(workgroups, workgroups, 1);
    }
}
