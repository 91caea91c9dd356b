use serde::{Deserialize, Serialize};

use sattrack_common::DEFAULT_ALTITUDE_SCALE;

/// Marker appearance on the globe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Multiplier on altitude / Earth radius when lifting markers off the globe
    #[serde(default = "default_altitude_scale")]
    pub altitude_scale: f64,

    /// RGB colour hint, e.g. 0xff0000
    #[serde(default = "default_marker_color")]
    pub marker_color: u32,

    /// Marker sphere size in globe units (independent of altitude)
    #[serde(default = "default_marker_size")]
    pub marker_size: f64,
}

fn default_altitude_scale() -> f64 {
    DEFAULT_ALTITUDE_SCALE
}

fn default_marker_color() -> u32 {
    0xff0000
}

fn default_marker_size() -> f64 {
    0.015
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            altitude_scale: default_altitude_scale(),
            marker_color: default_marker_color(),
            marker_size: default_marker_size(),
        }
    }
}
