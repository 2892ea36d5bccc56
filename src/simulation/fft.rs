//! GPU butterfly FFT: stage planning and the compute pipeline.
//!
//! The 2D inverse transform is separable: log2(N) butterfly passes along
//! the horizontal axis, then log2(N) along the vertical axis, ping-ponging
//! between two scratch textures (a pass can never read and write the same
//! texture). Stages are generated on demand, never stored.

use anyhow::{bail, Result};
use bytemuck::{Pod, Zeroable};

use crate::gpu::{GpuContext, SimTexture, SIM_TEXTURE_FORMAT};

/// One butterfly pass: which axis, the sub-transform size 2^i, and which
/// ping-pong scratch texture it reads / writes (index into a 2-element
/// array).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FftStage {
    pub horizontal: bool,
    pub sub_size: u32,
    pub input: usize,
    pub output: usize,
}

/// Stage plan for an N x N inverse transform (N a power of two).
#[derive(Debug, Clone)]
pub struct FftPlan {
    n: u32,
    stages_per_axis: u32,
}

impl FftPlan {
    /// Validate N here, at configuration time: a non-power-of-two N would
    /// make the sub_size = 2^i indexing silently wrong, not fail.
    pub fn new(n: u32) -> Result<Self> {
        if n < 2 || !n.is_power_of_two() {
            bail!("FFT size must be a power of two >= 2, got {}", n);
        }
        Ok(Self {
            n,
            stages_per_axis: n.trailing_zeros(),
        })
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn stage_count(&self) -> u32 {
        2 * self.stages_per_axis
    }

    /// The full stage sequence: horizontal passes with sub_size doubling
    /// 2..=N, then the same along the vertical axis. The chain starts by
    /// reading scratch texture 0.
    pub fn stages(&self) -> Vec<FftStage> {
        let k = self.stages_per_axis;
        (0..self.stage_count())
            .map(|i| FftStage {
                horizontal: i < k,
                sub_size: 1 << (i % k + 1),
                input: (i % 2) as usize,
                output: ((i + 1) % 2) as usize,
            })
            .collect()
    }

    /// Which scratch texture holds the final result, given the index the
    /// chain started in. Stage counts are even per axis pair, but the
    /// parity is computed, not assumed.
    pub fn final_index(&self, start: usize) -> usize {
        (start + self.stage_count() as usize) % 2
    }
}

/// Uniforms of one butterfly pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FftUniforms {
    size: u32,
    sub_size: u32,
    horizontal: u32,
    _padding: u32,
}

/// Compute pipeline executing the butterfly passes over the ping-pong
/// scratch textures.
pub struct FftPipeline {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    /// One (uniform buffer, bind group) per stage, rebuilt with the plan.
    stage_bindings: Vec<wgpu::BindGroup>,
    plan: FftPlan,
}

impl FftPipeline {
    pub fn new(gpu: &GpuContext, plan: FftPlan, ping: &[SimTexture; 2]) -> Self {
        let device = &gpu.device;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("FFT Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/fft.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("FFT Bind Group Layout"),
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

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("FFT Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("FFT Pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let mut this = Self {
            pipeline,
            bind_group_layout,
            stage_bindings: Vec::new(),
            plan,
        };
        this.rebuild_bindings(gpu, ping);
        this
    }

    /// Create the per-stage uniform buffers and bind groups. Each stage
    /// bakes its sub_size and its ping-pong texture pair.
    fn rebuild_bindings(&mut self, gpu: &GpuContext, ping: &[SimTexture; 2]) {
        use wgpu::util::DeviceExt;

        self.stage_bindings = self
            .plan
            .stages()
            .iter()
            .map(|stage| {
                let uniforms = FftUniforms {
                    size: self.plan.n(),
                    sub_size: stage.sub_size,
                    horizontal: stage.horizontal as u32,
                    _padding: 0,
                };
                let buffer = gpu
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("FFT Stage Uniforms"),
                        contents: bytemuck::cast_slice(&[uniforms]),
                        usage: wgpu::BufferUsages::UNIFORM,
                    });
                gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("FFT Stage Bind Group"),
                    layout: &self.bind_group_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(&ping[stage.input].view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::TextureView(&ping[stage.output].view),
                        },
                    ],
                })
            })
            .collect();
    }

    pub fn plan(&self) -> &FftPlan {
        &self.plan
    }

    /// Encode all 2 * log2(N) butterfly passes. The spectrum must already
    /// be in scratch texture 0; the spatial-domain result lands in
    /// `plan.final_index(0)`.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder) {
        let n = self.plan.n();
        let workgroups = n.div_ceil(8);
        for bind_group in &self.stage_bindings {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("FFT Butterfly Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, bind_group, &[]);
            pass.dispatch_workgroups(workgroups, workgroups, 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_rejects_non_power_of_two() {
        assert!(FftPlan::new(0).is_err());
        assert!(FftPlan::new(1).is_err());
        assert!(FftPlan::new(100).is_err());
        assert!(FftPlan::new(256).is_ok());
    }

    #[test]
    fn test_stage_sequence_shape() {
        let plan = FftPlan::new(16).unwrap();
        let stages = plan.stages();
        assert_eq!(stages.len(), 8);

        // horizontal first, sub sizes doubling 2..=N per axis
        let subs: Vec<u32> = stages.iter().map(|s| s.sub_size).collect();
        assert_eq!(subs, [2, 4, 8, 16, 2, 4, 8, 16]);
        assert!(stages[..4].iter().all(|s| s.horizontal));
        assert!(stages[4..].iter().all(|s| !s.horizontal));
    }

    #[test]
    fn test_ping_pong_never_aliases() {
        let plan = FftPlan::new(64).unwrap();
        for stage in plan.stages() {
            assert_ne!(
                stage.input, stage.output,
                "a pass must never read and write the same texture"
            );
        }
    }

    #[test]
    fn test_stage_chain_is_contiguous() {
        let plan = FftPlan::new(64).unwrap();
        let stages = plan.stages();
        let mut current = 0;
        for stage in &stages {
            assert_eq!(stage.input, current, "stage must read the previous output");
            current = stage.output;
        }
        assert_eq!(current, plan.final_index(0));
    }

    #[test]
    fn test_final_index_parity() {
        // even per-axis stage count: ends where it started
        let plan = FftPlan::new(16).unwrap(); // 2*4 = 8 stages
        assert_eq!(plan.final_index(0), 0);
        assert_eq!(plan.final_index(1), 1);

        // odd per-axis count still gives an even total, but a single-axis
        // chain of odd length must flip; parity is computed, not assumed
        let plan = FftPlan::new(8).unwrap(); // 2*3 = 6 stages
        assert_eq!(plan.final_index(0), 0);
        let half: Vec<_> = plan.stages().into_iter().filter(|s| s.horizontal).collect();
        assert_eq!(half.len() % 2, 1);
        assert_eq!(half.last().unwrap().output, 1);
    }
}
