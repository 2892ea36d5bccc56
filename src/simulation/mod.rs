//! GPU ocean surface simulation.
//!
//! Owns the simulation textures and the compute pass chain. Per frame:
//! time evolution, the butterfly FFT stages, then normal reconstruction.
//! Spectrum initialization reruns only when parameters change, detected by
//! comparing the parameter version against the version last built.

pub mod evolve;
pub mod fft;
pub mod normals;
pub mod spectrum;

use anyhow::Result;

use crate::gpu::{GpuContext, SimTexture};
use crate::params::SimulationParams;
use evolve::EvolvePass;
use fft::{FftPipeline, FftPlan};
use normals::NormalsPass;
use spectrum::SpectrumPasses;

pub struct OceanSimulation {
    // The spectrum textures themselves are kept alive by the pass bind
    // groups that reference their views.
    /// FFT ping-pong scratch pair. Evolution writes index 0; after the
    /// butterfly chain the spatial displacement field sits at
    /// `displacement_index`.
    ping: [SimTexture; 2],
    normals: SimTexture,
    displacement_index: usize,
    spectrum_passes: SpectrumPasses,
    evolve_pass: EvolvePass,
    fft_pipeline: FftPipeline,
    normals_pass: NormalsPass,
    params: SimulationParams,
    built_version: u64,
}

impl OceanSimulation {
    /// Build all textures and pipelines for the given parameters and run
    /// spectrum initialization once.
    pub fn new(gpu: &GpuContext, params: &SimulationParams) -> Result<Self> {
        params.validate()?;
        gpu.check_grid_size(params.modes)?;

        let n = params.modes;
        let plan = FftPlan::new(n)?;
        let displacement_index = plan.final_index(0);

        log::info!(
            "building ocean simulation: {}x{} grid, {} FFT stages",
            n,
            n,
            plan.stage_count()
        );

        let raw_spectrum = SimTexture::new(&gpu.device, n, "Raw Spectrum");
        let packed_spectrum = SimTexture::new(&gpu.device, n, "Packed Spectrum");
        let ping = [
            SimTexture::new(&gpu.device, n, "FFT Ping 0"),
            SimTexture::new(&gpu.device, n, "FFT Ping 1"),
        ];
        let normals = SimTexture::new(&gpu.device, n, "Normals");

        let spectrum_passes = SpectrumPasses::new(gpu, params, &raw_spectrum, &packed_spectrum);
        let evolve_pass = EvolvePass::new(gpu, params, &packed_spectrum, &ping[0]);
        let fft_pipeline = FftPipeline::new(gpu, plan, &ping);
        let normals_pass = NormalsPass::new(
            gpu,
            n,
            params.scale,
            &ping[displacement_index],
            &normals,
        );

        let sim = Self {
            ping,
            normals,
            displacement_index,
            spectrum_passes,
            evolve_pass,
            fft_pipeline,
            normals_pass,
            params: params.clone(),
            built_version: params.version(),
        };
        sim.run_initialization(gpu);
        Ok(sim)
    }

    /// Bring the simulation in line with `params` if it changed since the
    /// last build. A resolution change rebuilds everything; any other
    /// change rewrites uniforms and reruns initialization. Returns whether
    /// anything was rebuilt.
    pub fn sync(&mut self, gpu: &GpuContext, params: &SimulationParams) -> Result<bool> {
        if params.version() == self.built_version {
            return Ok(false);
        }
        params.validate()?;

        // resolution sizes the textures, scale is baked into the normals
        // pass; either one changing means a full rebuild
        if params.modes != self.params.modes || params.scale != self.params.scale {
            *self = Self::new(gpu, params)?;
            return Ok(true);
        }

        log::debug!("simulation parameters changed, reinitializing spectrum");
        self.spectrum_passes.write_uniforms(gpu, params);
        self.evolve_pass.set_params(params);
        self.params = params.clone();
        self.built_version = params.version();
        self.run_initialization(gpu);
        Ok(true)
    }

    fn run_initialization(&self, gpu: &GpuContext) {
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Spectrum Init Encoder"),
            });
        self.spectrum_passes.encode(&mut encoder);
        gpu.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Encode the per-frame chain for simulation time `t` onto `encoder`.
    pub fn encode_frame(&self, gpu: &GpuContext, encoder: &mut wgpu::CommandEncoder, t: f32) {
        self.evolve_pass.encode(gpu, encoder, t);
        self.fft_pipeline.encode(encoder);
        self.normals_pass.encode(encoder);
    }

    /// Spatial displacement field: RG = (height, residual), BA = choppy
    /// horizontal offsets.
    pub fn displacement_view(&self) -> &wgpu::TextureView {
        &self.ping[self.displacement_index].view
    }

    pub fn normals_view(&self) -> &wgpu::TextureView {
        &self.normals.view
    }

    pub fn grid_size(&self) -> u32 {
        self.params.modes
    }
}
