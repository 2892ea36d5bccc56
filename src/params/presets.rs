//! Named parameter presets: simulation and view bundles.

use super::{SimulationParams, ViewParams};

pub const PRESET_NAMES: [&str; 4] = ["calm", "default", "sunset", "glass"];

/// A simulation + view parameter bundle.
#[derive(Debug, Clone)]
pub struct Preset {
    pub simulation: SimulationParams,
    pub view: ViewParams,
}

impl Preset {
    /// Look up a preset by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default_sea()),
            "calm" => Some(Self::calm()),
            "sunset" => Some(Self::sunset()),
            "glass" => Some(Self::glass()),
            _ => None,
        }
    }

    /// Moderate wind, daylight colors.
    pub fn default_sea() -> Self {
        let mut simulation = SimulationParams::default();
        simulation.wind_x = 11.0;
        simulation.wind_y = 5.0;

        let mut view = ViewParams::default();
        view.yaw_deg = 60.0;
        view.interval_ms = 30;

        Self { simulation, view }
    }

    /// Low resolution, diagonal wind, closer camera.
    pub fn calm() -> Self {
        let mut simulation = SimulationParams::default();
        simulation.modes = 128;
        simulation.wind_x = 11.0;
        simulation.wind_y = 11.0;

        let mut view = ViewParams::default();
        view.pitch_deg = 18.0;
        view.yaw_deg = 114.0;
        view.distance_factor = 0.7;
        view.fov_deg = 40.0;
        view.sky_color = [0.14, 0.12, 0.19];
        view.sun_color = [0.75, 0.75, 0.74];
        view.water_color = [0.0, 0.04, 0.07];
        view.air_color = [0.01, 0.08, 0.13];

        Self { simulation, view }
    }

    /// Warm sky, strong ambient.
    pub fn sunset() -> Self {
        let mut simulation = SimulationParams::default();
        simulation.wind_x = 11.0;
        simulation.wind_y = 11.0;

        let mut view = ViewParams::default();
        view.pitch_deg = 5.0;
        view.yaw_deg = 40.0;
        view.distance_factor = 1.2;
        view.fov_deg = 40.0;
        view.sky_color = [1.0, 0.745, 0.435];
        view.sun_color = [1.0, 1.0, 1.0];
        view.water_color = [0.0, 0.04, 0.07];
        view.air_color = [0.012, 0.078, 0.129];
        view.ambient = 0.5;

        Self { simulation, view }
    }

    /// High resolution, faint wind, near-flat surface.
    pub fn glass() -> Self {
        let mut simulation = SimulationParams::default();
        simulation.modes = 1024;
        simulation.wind_x = 2.0;
        simulation.wind_y = 2.0;
        simulation.cutoff = 0.4;
        simulation.chopping = 0.5;

        let mut view = ViewParams::default();
        view.pitch_deg = 2.0;
        view.yaw_deg = 104.0;
        view.distance_factor = 1.2;
        view.fov_deg = 52.0;
        view.sky_color = [0.102, 0.373, 0.706];
        view.sun_color = [0.75, 0.75, 0.74];
        view.water_color = [0.012, 0.078, 0.129];
        view.air_color = [0.012, 0.078, 0.129];
        view.ambient = 0.3;
        view.specular = 0.6;

        Self { simulation, view }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_named_presets_resolve_and_validate() {
        for name in PRESET_NAMES {
            let preset = Preset::by_name(name).expect("preset name must resolve");
            assert!(
                preset.simulation.validate().is_ok(),
                "preset '{}' has invalid simulation parameters",
                name
            );
        }
    }

    #[test]
    fn test_unknown_preset_is_none() {
        assert!(Preset::by_name("tsunami").is_none());
    }
}
