//! Spindrift library: spectral deep-water ocean simulation and rendering.
//!
//! The pipeline follows the classic frequency-domain construction: a
//! persistent Phillips-spectrum field is built once per configuration,
//! each frame it is dispersed to time t, inverse-transformed by a GPU
//! butterfly FFT into a displacement field, and composited with Fresnel
//! shading. `spectral` holds the per-texel math shared (conceptually)
//! with the WGSL in `src/shaders/`; everything in it runs on the CPU so
//! the numeric invariants are testable without a GPU.

pub mod camera;
pub mod cli;
pub mod gpu;
pub mod ocean;
pub mod params;
pub mod rendering;
pub mod simulation;
pub mod spectral;
