//! Spectral simulation parameters.

use anyhow::{bail, Result};

/// Parameters of the spectral wave simulation.
///
/// Changing any field invalidates the persistent spectral field; callers
/// mutate and then `bump()` so the pipeline re-initializes on the next frame.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// Grid resolution per side (power of two, 16..=2048).
    pub modes: u32,

    /// Physical extent of one simulation patch in world units (meters).
    pub scale: f32,

    /// Wind vector x component (m/s).
    pub wind_x: f32,

    /// Wind vector y component (m/s).
    pub wind_y: f32,

    /// Spectral cutoff: suppresses wavelengths below this threshold
    /// (meters). Controls aliasing and capillary-ripple noise.
    pub cutoff: f32,

    /// Chop factor scaling horizontal displacement (dimensionless,
    /// 0 = pure heave, ~0.7 = sharp crests). Artistic, not physical.
    pub chopping: f32,

    /// Global amplitude multiplier (dimensionless, 1.0 = reference).
    pub amplitude: f32,

    /// Seed pair in [0, 1) driving the per-texel Gaussian draws.
    pub seed: [f32; 2],

    /// Simulation time step per rendered frame (seconds).
    pub time_step: f32,

    version: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            modes: 512,
            scale: 150.0,
            wind_x: 9.0,
            wind_y: 3.0,
            cutoff: 0.5,
            chopping: 0.7,
            amplitude: 1.0,
            seed: [0.42, 0.17],
            time_step: 0.1,
            version: 0,
        }
    }
}

impl SimulationParams {
    /// Current configuration version. Starts at 0, bumped on every change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Mark the parameters as changed.
    pub fn bump(&mut self) {
        self.version += 1;
    }

    /// Take every field from `other` while keeping this instance's version
    /// history monotonic. Used when switching presets at runtime.
    pub fn adopt(&mut self, other: &Self) {
        let version = self.version;
        *self = other.clone();
        self.version = version;
        self.bump();
    }

    /// Wind vector magnitude squared (m^2/s^2).
    pub fn wind_mag_sq(&self) -> f32 {
        self.wind_x * self.wind_x + self.wind_y * self.wind_y
    }

    /// Amplitude actually injected into the initial spectrum.
    ///
    /// The 1/50 reference scale puts `amplitude = 1` at a plausible sea
    /// state; the extra `modes` factor compensates for the 1/N-per-axis
    /// normalization carried by the inverse transform.
    pub fn spectrum_amplitude(&self) -> f32 {
        self.amplitude * self.modes as f32 / 50.0
    }

    /// Validate the configuration.
    ///
    /// Non-power-of-two resolutions are a configuration error: the butterfly
    /// decomposition assumes radix 2 and would produce silently wrong output.
    pub fn validate(&self) -> Result<()> {
        if !self.modes.is_power_of_two() {
            bail!("grid resolution must be a power of two, got {}", self.modes);
        }
        if !(16..=2048).contains(&self.modes) {
            bail!("grid resolution must be in 16..=2048, got {}", self.modes);
        }
        if self.scale <= 0.0 {
            bail!("patch scale must be positive, got {}", self.scale);
        }
        if self.wind_mag_sq() == 0.0 {
            bail!("wind vector must be non-zero");
        }
        for s in self.seed {
            if !(0.0..1.0).contains(&s) {
                bail!("seed values must lie in [0, 1), got {}", s);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_valid() {
        assert!(SimulationParams::default().validate().is_ok());
    }

    #[test]
    fn test_non_power_of_two_rejected() {
        let mut params = SimulationParams::default();
        params.modes = 100;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_resolution_range_enforced() {
        let mut params = SimulationParams::default();
        params.modes = 8;
        assert!(params.validate().is_err(), "below range");
        params.modes = 4096;
        assert!(params.validate().is_err(), "above range");
        params.modes = 2048;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_zero_wind_rejected() {
        let mut params = SimulationParams::default();
        params.wind_x = 0.0;
        params.wind_y = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_version_bumps_monotonically() {
        let mut params = SimulationParams::default();
        let v0 = params.version();
        params.wind_x = 11.0;
        params.bump();
        assert!(params.version() > v0);
    }
}
