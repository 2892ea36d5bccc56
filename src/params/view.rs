//! View and shading parameters.

/// Camera and shading parameters for the surface compositor.
///
/// Angles follow an orbit camera: yaw spins around the vertical axis,
/// pitch tilts down toward the surface.
#[derive(Debug, Clone)]
pub struct ViewParams {
    /// Sky reflection color (linear RGB).
    pub sky_color: [f32; 3],

    /// Sun color used for the specular highlight (linear RGB).
    pub sun_color: [f32; 3],

    /// Water transmission color (linear RGB).
    pub water_color: [f32; 3],

    /// Atmospheric fade color at the horizon (linear RGB).
    pub air_color: [f32; 3],

    /// Ambient lighting strength (0..1).
    pub ambient: f32,

    /// Specular highlight strength (0..1).
    pub specular: f32,

    /// Direction toward the light, world space (normalized at use).
    pub light_dir: [f32; 3],

    /// Refractive index of air.
    pub n1: f32,

    /// Refractive index of water.
    pub n2: f32,

    /// Orbit pitch above the horizon (degrees).
    pub pitch_deg: f32,

    /// Orbit yaw around the vertical axis (degrees).
    pub yaw_deg: f32,

    /// Camera distance as a multiple of the patch scale.
    pub distance_factor: f32,

    /// Vertical field of view (degrees). Smaller = zoomed in.
    pub fov_deg: f32,

    /// Vertical scale applied to the height channel at composition time.
    pub vertical_scale: f32,

    /// Minimum milliseconds between frames (0 = uncapped).
    pub interval_ms: u64,

    version: u64,
}

impl Default for ViewParams {
    fn default() -> Self {
        Self {
            sky_color: [0.60, 0.76, 0.95],
            sun_color: [1.0, 1.0, 1.0],
            water_color: [0.00, 0.04, 0.07],
            air_color: [0.01, 0.08, 0.13],
            ambient: 0.25,
            specular: 1.0,
            light_dir: [1.5, 1.0, 0.0],
            n1: 1.0,
            n2: 1.34,
            pitch_deg: 40.0,
            yaw_deg: -65.0,
            distance_factor: 1.5,
            fov_deg: 24.0,
            vertical_scale: 0.33,
            interval_ms: 30,
            version: 0,
        }
    }
}

impl ViewParams {
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

    /// Adjust yaw by `delta` degrees.
    pub fn step_yaw(&mut self, delta: f32) {
        self.yaw_deg = (self.yaw_deg + delta).rem_euclid(360.0);
        self.bump();
    }

    /// Adjust pitch by `delta` degrees, clamped to (0, 90).
    pub fn step_pitch(&mut self, delta: f32) {
        self.pitch_deg = (self.pitch_deg + delta).clamp(1.0, 89.0);
        self.bump();
    }

    /// Adjust camera distance by `delta` patch-scale multiples.
    pub fn step_distance(&mut self, delta: f32) {
        self.distance_factor = (self.distance_factor + delta).max(0.1);
        self.bump();
    }

    /// Adjust the field of view by `delta` degrees (zoom).
    pub fn step_zoom(&mut self, delta: f32) {
        self.fov_deg = (self.fov_deg + delta).clamp(5.0, 120.0);
        self.bump();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_stays_above_horizon() {
        let mut view = ViewParams::default();
        for _ in 0..200 {
            view.step_pitch(-5.0);
        }
        assert!(view.pitch_deg >= 1.0);
    }

    #[test]
    fn test_step_helpers_bump_version() {
        let mut view = ViewParams::default();
        let v0 = view.version();
        view.step_yaw(10.0);
        view.step_zoom(-2.0);
        assert_eq!(view.version(), v0 + 2);
    }
}
