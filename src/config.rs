//! Heatmap Configuration Module
//! Presentation settings passed into the renderers, with JSON preset support.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default color-scale minimum (expected pressure delta, mbar)
pub const DEFAULT_VMIN: f64 = -80.0;
/// Default color-scale maximum (expected pressure delta, mbar)
pub const DEFAULT_VMAX: f64 = 20.0;

/// Largest accepted width or height of a static render, in pixels.
pub const MAX_IMAGE_DIMENSION: u32 = 8192;

pub const X_AXIS_LABEL: &str = "Relative Longitude";
pub const Y_AXIS_LABEL: &str = "Relative Latitude";
pub const COLORBAR_LABEL: &str = "Δ Pressure (mbar)";
pub const ALL_LAPS_LABEL: &str = "All Laps";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access preset file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid preset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Color scale minimum ({vmin}) must be below maximum ({vmax})")]
    InvalidColorScale { vmin: f64, vmax: f64 },
    #[error("Image size must be non-zero (got {width}x{height})")]
    InvalidSize { width: u32, height: u32 },
    #[error("Image size {width}x{height} exceeds the {max} pixel limit")]
    SizeTooLarge { width: u32, height: u32, max: u32 },
}

/// Presentation settings for a heatmap figure.
///
/// Every field has a default, so a preset file only needs to list the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Figure super-title. `None` (or blank) means "{port} Heatmap".
    pub title: Option<String>,
    /// Color-scale minimum; lower readings saturate to the coolest color.
    pub vmin: f64,
    /// Color-scale maximum; higher readings saturate to the warmest color.
    pub vmax: f64,
    /// Marker radius in pixels for static renders.
    pub point_radius: u32,
    /// Width in pixels of one panel in static renders.
    pub width: u32,
    /// Height in pixels of static renders.
    pub height: u32,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            title: None,
            vmin: DEFAULT_VMIN,
            vmax: DEFAULT_VMAX,
            point_radius: 3,
            width: 900,
            height: 800,
        }
    }
}

impl HeatmapConfig {
    /// Load a preset from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the preset as pretty-printed JSON.
    pub fn save_json_file(&self, path: &Path) -> Result<(), ConfigError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.vmin.is_finite() || !self.vmax.is_finite() || self.vmin >= self.vmax {
            return Err(ConfigError::InvalidColorScale {
                vmin: self.vmin,
                vmax: self.vmax,
            });
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_IMAGE_DIMENSION || self.height > MAX_IMAGE_DIMENSION {
            return Err(ConfigError::SizeTooLarge {
                width: self.width,
                height: self.height,
                max: MAX_IMAGE_DIMENSION,
            });
        }
        Ok(())
    }

    /// Resolve the figure super-title for the given pressure port.
    pub fn suptitle(&self, port: &str) -> String {
        match self.custom_title() {
            Some(title) => title.to_string(),
            None => format!("{} Heatmap", port),
        }
    }

    /// Super-title for a figure with one or two port panels.
    ///
    /// A custom title always wins. Otherwise a two-port figure is titled
    /// like "run.csv – P1 vs P2 Heatmaps (Lap 5, Clipped: -80 to +20 mbar)".
    pub fn figure_suptitle(&self, source: &str, ports: &[&str], lap_label: &str) -> String {
        match ports {
            [first, second] if self.custom_title().is_none() => format!(
                "{} – {} vs {} Heatmaps ({}, Clipped: {} to {:+} mbar)",
                source, first, second, lap_label, self.vmin, self.vmax
            ),
            [first, ..] => self.suptitle(first),
            [] => self.custom_title().unwrap_or_default().to_string(),
        }
    }

    fn custom_title(&self) -> Option<&str> {
        self.title.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_expected_pressure_bounds() {
        let config = HeatmapConfig::default();
        assert_eq!(config.vmin, -80.0);
        assert_eq!(config.vmax, 20.0);
        assert!(config.title.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_preset_keeps_remaining_defaults() {
        let config: HeatmapConfig =
            serde_json::from_str(r#"{ "vmin": -50.0, "title": "Front wing" }"#).unwrap();
        assert_eq!(config.vmin, -50.0);
        assert_eq!(config.vmax, DEFAULT_VMAX);
        assert_eq!(config.title.as_deref(), Some("Front wing"));
        assert_eq!(config.width, 900);
    }

    #[test]
    fn inverted_color_scale_is_rejected() {
        let config = HeatmapConfig {
            vmin: 10.0,
            vmax: -10.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidColorScale { .. })
        ));

        let config = HeatmapConfig {
            vmax: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_size_is_rejected() {
        let config = HeatmapConfig {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSize { width: 0, .. })
        ));
    }

    #[test]
    fn oversized_preset_is_rejected() {
        let config: HeatmapConfig = serde_json::from_str(r#"{ "width": 3000000000 }"#).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SizeTooLarge { width: 3_000_000_000, .. })
        ));

        let at_limit = HeatmapConfig {
            width: MAX_IMAGE_DIMENSION,
            height: MAX_IMAGE_DIMENSION,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn suptitle_falls_back_to_port_name() {
        let mut config = HeatmapConfig::default();
        assert_eq!(config.suptitle("P1"), "P1 Heatmap");

        config.title = Some("   ".to_string());
        assert_eq!(config.suptitle("P1"), "P1 Heatmap");

        config.title = Some("Session 3".to_string());
        assert_eq!(config.suptitle("P1"), "Session 3");
    }

    #[test]
    fn comparison_title_names_both_ports_and_clip_range() {
        let config = HeatmapConfig::default();
        assert_eq!(
            config.figure_suptitle("run.csv", &["P1", "P2"], "Lap 5"),
            "run.csv – P1 vs P2 Heatmaps (Lap 5, Clipped: -80 to +20 mbar)"
        );
        assert_eq!(config.figure_suptitle("run.csv", &["P1"], "Lap 5"), "P1 Heatmap");

        let titled = HeatmapConfig {
            title: Some("Wing test".to_string()),
            ..config
        };
        assert_eq!(titled.figure_suptitle("run.csv", &["P1", "P2"], "All Laps"), "Wing test");
    }

    #[test]
    fn preset_file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "pressure_heatmap_preset_{}.json",
            std::process::id()
        ));
        let config = HeatmapConfig {
            title: Some("Lap study".to_string()),
            vmin: -60.0,
            vmax: 30.0,
            ..Default::default()
        };
        config.save_json_file(&path).unwrap();
        let loaded = HeatmapConfig::from_json_file(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, config);
    }
}
