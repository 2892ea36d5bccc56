//! Command-line argument parsing.

use anyhow::{bail, Result};
use clap::Parser;

use crate::params::{Preset, RecordingConfig, SimulationParams, ViewParams, PRESET_NAMES};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "Spindrift")]
#[command(about = "Spectral ocean surface simulator", long_about = None)]
pub struct Args {
    /// Parameter preset: calm, default, sunset, glass
    #[arg(long, value_name = "NAME", default_value = "default")]
    pub preset: String,

    /// Grid resolution (power of two, 16..=2048)
    #[arg(long, value_name = "N")]
    pub modes: Option<u32>,

    /// Patch size in meters
    #[arg(long, value_name = "METERS")]
    pub scale: Option<f32>,

    /// Wind velocity, x component (m/s)
    #[arg(long, value_name = "MPS")]
    pub wind_x: Option<f32>,

    /// Wind velocity, y component (m/s)
    #[arg(long, value_name = "MPS")]
    pub wind_y: Option<f32>,

    /// Small-wave cutoff length (meters)
    #[arg(long, value_name = "METERS")]
    pub cutoff: Option<f32>,

    /// Horizontal chop strength
    #[arg(long, value_name = "FACTOR")]
    pub chop: Option<f32>,

    /// Overall wave amplitude multiplier
    #[arg(long, value_name = "FACTOR")]
    pub amplitude: Option<f32>,

    /// Random seed, two components in [0, 1)
    #[arg(long, value_name = "S", num_args = 2)]
    pub seed: Option<Vec<f32>>,

    /// Start with time evolution paused
    #[arg(long)]
    pub paused: bool,

    /// Record frames to ./recording (duration in seconds)
    #[arg(long, value_name = "SECONDS")]
    pub record: Option<f32>,

    /// Capture a single frame to ./recording and exit
    #[arg(long, conflicts_with = "record")]
    pub capture: bool,
}

impl Args {
    /// Resolve the preset and apply per-flag overrides on top of it.
    pub fn resolve(&self) -> Result<(SimulationParams, ViewParams)> {
        let Some(preset) = Preset::by_name(&self.preset) else {
            bail!(
                "unknown preset '{}' (available: {})",
                self.preset,
                PRESET_NAMES.join(", ")
            );
        };
        let Preset {
            mut simulation,
            view,
        } = preset;

        if let Some(modes) = self.modes {
            simulation.modes = modes;
        }
        if let Some(scale) = self.scale {
            simulation.scale = scale;
        }
        if let Some(wind_x) = self.wind_x {
            simulation.wind_x = wind_x;
        }
        if let Some(wind_y) = self.wind_y {
            simulation.wind_y = wind_y;
        }
        if let Some(cutoff) = self.cutoff {
            simulation.cutoff = cutoff;
        }
        if let Some(chop) = self.chop {
            simulation.chopping = chop;
        }
        if let Some(amplitude) = self.amplitude {
            simulation.amplitude = amplitude;
        }
        if let Some(seed) = &self.seed {
            simulation.seed = [seed[0], seed[1]];
        }

        simulation.validate()?;
        Ok((simulation, view))
    }

    pub fn recording_config(&self) -> Option<RecordingConfig> {
        if self.capture {
            // one frame at the default frame rate
            let config = RecordingConfig::new(0.0);
            return Some(RecordingConfig {
                duration_secs: 1.0 / config.fps as f32,
                ..config
            });
        }
        self.record.map(RecordingConfig::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::parse_from(std::iter::once(&"spindrift").chain(argv.iter()))
    }

    #[test]
    fn test_defaults_resolve() {
        let (simulation, view) = parse(&[]).resolve().unwrap();
        assert_eq!(simulation.modes, 512);
        assert!(view.interval_ms > 0);
    }

    #[test]
    fn test_overrides_apply_on_top_of_preset() {
        let args = parse(&["--preset", "calm", "--modes", "64", "--wind-x", "4.5"]);
        let (simulation, _) = args.resolve().unwrap();
        assert_eq!(simulation.modes, 64);
        assert_eq!(simulation.wind_x, 4.5);
        // untouched preset value survives
        assert_eq!(simulation.wind_y, 11.0);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let args = parse(&["--modes", "100"]);
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        let args = parse(&["--preset", "maelstrom"]);
        assert!(args.resolve().is_err());
    }

    #[test]
    fn test_capture_records_exactly_one_frame() {
        let config = parse(&["--capture"]).recording_config().unwrap();
        assert_eq!(config.total_frames(), 1);
    }

    #[test]
    fn test_seed_takes_two_components() {
        let args = parse(&["--seed", "0.1", "0.9"]);
        let (simulation, _) = args.resolve().unwrap();
        assert_eq!(simulation.seed, [0.1, 0.9]);
    }
}
