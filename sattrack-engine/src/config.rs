use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use sattrack_scene::SceneConfig;

use crate::module::fetch::DEFAULT_ENDPOINT;
use crate::module::frames::EarthModel;
use crate::module::session::SessionSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Rotated log files older than this are deleted
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u64,

    #[serde(default)]
    pub tracking: TrackingConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub scene: SceneConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// NORAD catalog number tracked at startup
    #[serde(default = "default_satellite_id")]
    pub satellite_id: u32,

    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default)]
    pub earth_model: EarthModel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_retention_days() -> u64 {
    3
}

fn default_satellite_id() -> u32 {
    25544
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("sattrack/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            log_retention_days: default_log_retention_days(),
            tracking: TrackingConfig::default(),
            fetch: FetchConfig::default(),
            scene: SceneConfig::default(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            satellite_id: default_satellite_id(),
            tick_interval_ms: default_tick_interval_ms(),
            earth_model: EarthModel::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl TrackingConfig {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            tick_interval: Duration::from_millis(self.tick_interval_ms),
            earth_model: self.earth_model,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl TrackerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: TrackerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tracking.tick_interval_ms == 0 {
            anyhow::bail!("tracking.tick_interval_ms must be greater than zero");
        }
        if self.tracking.satellite_id == 0 {
            anyhow::bail!("tracking.satellite_id must be a positive catalog number");
        }
        Ok(())
    }
}

pub static CONFIG: OnceLock<TrackerConfig> = OnceLock::new();

/// Load the process-wide configuration once; later calls return the first one.
pub fn read_config(path: impl AsRef<Path>) -> anyhow::Result<&'static TrackerConfig> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    let config = TrackerConfig::from_file(path)?;
    Ok(CONFIG.get_or_init(|| config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_from_empty_file() {
        let file = write_config("");
        let config = TrackerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_retention_days, 3);
        assert_eq!(config.tracking.satellite_id, 25544);
        assert_eq!(config.tracking.earth_model, EarthModel::Wgs84);
        assert_eq!(config.fetch.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.scene.marker_color, 0xff0000);
        assert_eq!(
            config.tracking.session_settings().tick_interval,
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_sections() {
        let file = write_config(
            r#"
log_level = "debug"

[tracking]
satellite_id = 33591
tick_interval_ms = 500
earth_model = "spherical"

[fetch]
timeout_secs = 5

[scene]
altitude_scale = 1.0
marker_color = 0x00ff00
"#,
        );
        let config = TrackerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.tracking.satellite_id, 33591);
        assert_eq!(config.tracking.earth_model, EarthModel::Spherical);
        assert_eq!(config.tracking.session_settings().tick_interval, Duration::from_millis(500));
        assert_eq!(config.fetch.timeout(), Duration::from_secs(5));
        assert_eq!(config.fetch.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.scene.altitude_scale, 1.0);
        assert_eq!(config.scene.marker_color, 0x00ff00);
        assert_eq!(config.scene.marker_size, 0.015);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let file = write_config("[tracking]\ntick_interval_ms = 0\n");
        assert!(TrackerConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_unknown_earth_model() {
        let file = write_config("[tracking]\nearth_model = \"flat\"\n");
        assert!(TrackerConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(TrackerConfig::from_file("does/not/exist.toml").is_err());
    }
}
