use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Tunable board settings. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoardConfig {
    pub physics: PhysicsConfig,
    pub camera: CameraConfig,
    pub render: RenderConfig,
    pub viewport: ViewportConfig,
}

impl BoardConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub repulsion: f32,
    /// Floor applied to the squared distance in the repulsion term.
    pub min_distance_sq: f32,
    pub spring: f32,
    pub ideal_length: f32,
    pub gravity: f32,
    pub damping: f32,
    /// Per-component velocity clamp.
    pub max_velocity: f32,
    pub spiral_base: f32,
    pub spiral_step: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            repulsion: 2000.0,
            min_distance_sq: 100.0,
            spring: 0.05,
            ideal_length: 100.0,
            gravity: 0.002,
            damping: 0.85,
            max_velocity: 12.0,
            spiral_base: 30.0,
            spiral_step: 12.0,
        }
    }
}

impl PhysicsConfig {
    /// Keeps the constants inside ranges where the integrator stays bounded.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        Self {
            repulsion: finite_or(self.repulsion, defaults.repulsion).max(0.0),
            min_distance_sq: finite_or(self.min_distance_sq, defaults.min_distance_sq).max(1.0),
            spring: finite_or(self.spring, defaults.spring).clamp(0.0, 0.5),
            ideal_length: finite_or(self.ideal_length, defaults.ideal_length).max(1.0),
            gravity: finite_or(self.gravity, defaults.gravity).clamp(0.0, 0.05),
            damping: finite_or(self.damping, defaults.damping).clamp(0.05, 0.99),
            max_velocity: finite_or(self.max_velocity, defaults.max_velocity).max(0.1),
            spiral_base: finite_or(self.spiral_base, defaults.spiral_base).max(0.0),
            spiral_step: finite_or(self.spiral_step, defaults.spiral_step).max(0.1),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub scroll_sensitivity: f32,
    /// Pointer travel in pixels below which a press+release counts as a click.
    pub click_threshold: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.3,
            max_zoom: 3.0,
            scroll_sensitivity: 0.0018,
            click_threshold: 4.0,
        }
    }
}

impl CameraConfig {
    /// Orders the zoom bounds and replaces unusable values with defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let positive_or = |value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };

        let min_zoom = positive_or(self.min_zoom, defaults.min_zoom);
        let max_zoom = positive_or(self.max_zoom, defaults.max_zoom);
        Self {
            min_zoom: min_zoom.min(max_zoom),
            max_zoom: min_zoom.max(max_zoom),
            scroll_sensitivity: positive_or(self.scroll_sensitivity, defaults.scroll_sensitivity),
            click_threshold: positive_or(self.click_threshold, defaults.click_threshold),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Screen-space radius; does not scale with zoom.
    pub node_radius: f32,
    pub label_min_zoom: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node_radius: 14.0,
            label_min_zoom: 0.9,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1440.0,
            height: 920.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: BoardConfig =
            serde_json::from_str(r#"{"physics": {"ideal_length": 140.0}, "camera": {"max_zoom": 2.0}}"#)
                .unwrap();

        assert_eq!(config.physics.ideal_length, 140.0);
        assert_eq!(config.physics.damping, PhysicsConfig::default().damping);
        assert_eq!(config.camera.max_zoom, 2.0);
        assert_eq!(config.camera.min_zoom, 0.3);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn sanitized_keeps_damping_inside_open_interval() {
        let physics = PhysicsConfig {
            damping: 1.5,
            min_distance_sq: 0.0,
            gravity: f32::NAN,
            ..PhysicsConfig::default()
        }
        .sanitized();

        assert!(physics.damping > 0.0 && physics.damping < 1.0);
        assert!(physics.min_distance_sq > 0.0);
        assert_eq!(physics.gravity, PhysicsConfig::default().gravity);
    }

    #[test]
    fn sanitized_camera_orders_zoom_bounds() {
        let camera = CameraConfig {
            min_zoom: 2.0,
            max_zoom: 0.5,
            click_threshold: -1.0,
            ..CameraConfig::default()
        }
        .sanitized();

        assert_eq!((camera.min_zoom, camera.max_zoom), (0.5, 2.0));
        assert_eq!(camera.click_threshold, CameraConfig::default().click_threshold);
    }
}
