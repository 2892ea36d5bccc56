//! Shared wgpu device setup and simulation texture helpers.
//!
//! The compute passes and the renderer both need the device and queue, so
//! they live here rather than inside the render system.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::window::Window;

/// Every simulation texture uses this format: filterable float with enough
/// precision for spectra, and a core-spec storage-write format.
pub const SIM_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Shared GPU handles.
pub struct GpuContext {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Create the instance, surface (when a window is given), adapter and
    /// device. The surface is returned alongside so the render system can
    /// configure it.
    pub async fn new(window: Option<Arc<Window>>) -> Result<(Self, Option<wgpu::Surface<'static>>)> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = match window {
            Some(window) => Some(
                instance
                    .create_surface(window)
                    .context("Failed to create surface")?,
            ),
            None => None,
        };

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: surface.as_ref(),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("Failed to find suitable GPU adapter"))?;

        log::info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Main Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .context("Failed to request device")?;

        Ok((
            Self {
                adapter,
                device,
                queue,
            },
            surface,
        ))
    }

    /// The simulation allocates N x N textures; reject resolutions the
    /// device cannot hold before any allocation happens.
    pub fn check_grid_size(&self, n: u32) -> Result<()> {
        let max = self.device.limits().max_texture_dimension_2d;
        if n > max {
            return Err(anyhow!(
                "grid resolution {} exceeds device texture limit {}",
                n,
                max
            ));
        }
        Ok(())
    }
}

/// An N x N Rgba16Float texture usable as both a sampled input and a
/// storage output of compute passes.
pub struct SimTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl SimTexture {
    pub fn new(device: &wgpu::Device, n: u32, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: n,
                height: n,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SIM_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}
