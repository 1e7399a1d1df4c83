//! Application settings

use std::path::PathBuf;

use anyhow::{ensure, Context};
use face_tracking::TrackingConfig;
use overlay::{ViewConfig, ViewTransform};
use serde::{Deserialize, Serialize};
use tracing::Level;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Replay configuration: file, then `FACE_OVERLAY_*` environment overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Detector event stream (JSON lines); stdin when unset
    pub input: Option<PathBuf>,

    /// Draw list output (JSON lines); stdout when unset
    pub output: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    pub log_level: String,

    pub log_format: LogFormat,

    /// Events buffered between the reader and the tracker
    pub channel_capacity: usize,

    pub view: ViewConfig,

    pub tracking: TrackingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            channel_capacity: 64,
            view: ViewConfig::default(),
            tracking: TrackingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Prefix of environment overrides, e.g. `FACE_OVERLAY_TRACKING__SMILE_THRESHOLD`
    pub const ENV_PREFIX: &'static str = "FACE_OVERLAY";

    /// Variable naming the config file
    pub const PATH_VAR: &'static str = "FACE_OVERLAY_CONFIG";

    pub const DEFAULT_PATH: &'static str = "face-overlay.toml";

    /// Load from the file named by `FACE_OVERLAY_CONFIG` (default
    /// `face-overlay.toml`, optional) and the environment
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(Self::PATH_VAR).unwrap_or_else(|_| Self::DEFAULT_PATH.to_string());
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("loading configuration from {path}"))?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("parsing configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document, without environment overrides
    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()
            .context("reading TOML configuration")?
            .try_deserialize()
            .context("parsing configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.level()?;
        ensure!(self.channel_capacity > 0, "channel_capacity must be positive");
        self.tracking.validate()?;
        ViewTransform::new(&self.view)?;
        Ok(())
    }

    /// Parsed log level
    pub fn level(&self) -> anyhow::Result<Level> {
        self.log_level
            .parse::<Level>()
            .with_context(|| format!("invalid log_level {:?}", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.level().unwrap(), Level::INFO);
    }

    #[test]
    fn test_from_toml() {
        let config = AppConfig::from_toml(
            r#"
            log_level = "debug"
            log_format = "json"
            input = "events.jsonl"

            [view]
            preview_width = 320.0
            preview_height = 240.0
            front_facing = false

            [tracking]
            retain_smile_on_uncomputed = true

            [tracking.iris]
            halflife_s = 0.2
            "#,
        )
        .unwrap();

        assert_eq!(config.level().unwrap(), Level::DEBUG);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.input, Some(PathBuf::from("events.jsonl")));
        assert!(!config.view.front_facing);
        assert_eq!(config.view.view_width, 640.0);
        assert!(config.tracking.retain_smile_on_uncomputed);
        assert_eq!(config.tracking.iris.halflife_s, 0.2);
        assert_eq!(config.tracking.eye_open_threshold, 0.4);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(AppConfig::from_toml(r#"log_level = "loud""#).is_err());
        assert!(AppConfig::from_toml("channel_capacity = 0").is_err());
        assert!(AppConfig::from_toml("[tracking]\nsmile_threshold = 3.0").is_err());
        assert!(AppConfig::from_toml("[view]\nview_width = -1.0").is_err());
    }
}
