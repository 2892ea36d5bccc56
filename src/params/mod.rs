//! Parameter definitions with physical units and documented semantics.
//!
//! Every tunable of the simulation and the view lives here, with:
//! - Physical units (meters, degrees, seconds)
//! - Documented ranges and meanings
//! - A version counter per group: mutate fields, then `bump()`; consumers
//!   remember the version they last built against and rebuild on change.

mod presets;
mod render;
mod simulation;
mod view;

pub use presets::{Preset, PRESET_NAMES};
pub use render::{RecordingConfig, RenderConfig};
pub use simulation::SimulationParams;
pub use view::ViewParams;

/// Gravitational acceleration (m/s^2), shared by kernels and shaders.
pub const G: f32 = 9.81;
