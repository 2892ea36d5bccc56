//! Spectrum initialization passes.
//!
//! Two compute passes run whenever simulation parameters change, never per
//! frame. The first fills the raw spectrum texture with Phillips-weighted
//! Gaussian draws; the second packs each wavenumber together with its
//! mirrored conjugate partner so the per-frame evolution pass needs a
//! single texture read.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::gpu::{GpuContext, SimTexture, SIM_TEXTURE_FORMAT};
use crate::params::SimulationParams;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct InitUniforms {
    size: u32,
    scale: f32,
    wind_x: f32,
    wind_y: f32,
    cutoff: f32,
    amplitude: f32,
    seed_x: f32,
    seed_y: f32,
}

impl InitUniforms {
    fn from_params(params: &SimulationParams) -> Self {
        Self {
            size: params.modes,
            scale: params.scale,
            wind_x: params.wind_x,
            wind_y: params.wind_y,
            cutoff: params.cutoff,
            amplitude: params.spectrum_amplitude(),
            seed_x: params.seed[0],
            seed_y: params.seed[1],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct PackUniforms {
    size: u32,
    _padding: [u32; 3],
}

/// The initialization and conjugate-packing pipelines with their bindings.
pub struct SpectrumPasses {
    init_pipeline: wgpu::ComputePipeline,
    init_uniform_buffer: wgpu::Buffer,
    init_bind_group: wgpu::BindGroup,
    pack_pipeline: wgpu::ComputePipeline,
    pack_bind_group: wgpu::BindGroup,
    n: u32,
}

impl SpectrumPasses {
    pub fn new(
        gpu: &GpuContext,
        params: &SimulationParams,
        raw_spectrum: &SimTexture,
        packed_spectrum: &SimTexture,
    ) -> Self {
        let device = &gpu.device;

        let init_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Spectrum Init Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/spectrum_init.wgsl").into()),
        });

        let pack_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Spectrum Pack Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/spectrum_pack.wgsl").into()),
        });

        let init_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Spectrum Init Uniforms"),
            contents: bytemuck::cast_slice(&[InitUniforms::from_params(params)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let init_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Spectrum Init Bind Group Layout"),
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
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: SIM_TEXTURE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let init_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Spectrum Init Bind Group"),
            layout: &init_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: init_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&raw_spectrum.view),
                },
            ],
        });

        let init_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Spectrum Init Pipeline Layout"),
                bind_group_layouts: &[&init_layout],
                push_constant_ranges: &[],
            });

        let init_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Spectrum Init Pipeline"),
            layout: Some(&init_pipeline_layout),
            module: &init_shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let pack_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Spectrum Pack Uniforms"),
            contents: bytemuck::cast_slice(&[PackUniforms {
                size: params.modes,
                _padding: [0; 3],
            }]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let pack_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Spectrum Pack Bind Group Layout"),
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

        let pack_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Spectrum Pack Bind Group"),
            layout: &pack_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: pack_uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&raw_spectrum.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&packed_spectrum.view),
                },
            ],
        });

        let pack_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Spectrum Pack Pipeline Layout"),
                bind_group_layouts: &[&pack_layout],
                push_constant_ranges: &[],
            });

        let pack_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Spectrum Pack Pipeline"),
            layout: Some(&pack_pipeline_layout),
            module: &pack_shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            init_pipeline,
            init_uniform_buffer,
            init_bind_group,
            pack_pipeline,
            pack_bind_group,
            n: params.modes,
        }
    }

    /// Push fresh parameter values. Only valid while the resolution is
    /// unchanged; a resolution change rebuilds the passes instead.
    pub fn write_uniforms(&self, gpu: &GpuContext, params: &SimulationParams) {
        debug_assert_eq!(params.modes, self.n);
        gpu.queue.write_buffer(
            &self.init_uniform_buffer,
            0,
            bytemuck::cast_slice(&[InitUniforms::from_params(params)]),
        );
    }

    /// Encode init then pack. Pack reads the texture init wrote, which is
    /// why they are separate passes.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let workgroups = self.n.div_ceil(8);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Spectrum Init Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.init_pipeline);
        pass.set_bind_group(0, &self.init_bind_group, &[]);
        pass.dispatch_workgroups(workgroups, workgroups, 1);
        drop(pass);

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Spectrum Pack Pass"),
            timestamp_writes: None,
        });
        pass.set_pipeline(&self.pack_pipeline);
        pass.set_bind_group(0, &self.pack_bind_group, &[]);
        pass.dispatch_workgroups(workgroups, workgroups, 1);
    }
}
