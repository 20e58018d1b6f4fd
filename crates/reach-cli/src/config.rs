//! User configuration.
//!
//! Read from `$REACH_HOME/config.toml` (default `~/.reach/config.toml`). A
//! missing file means built-in defaults:
//!
//! ```toml
//! [defaults]
//! zone1_percent = 85
//! arc_angle = 60
//!
//! [logging]
//! level = "info"
//!
//! [output]
//! format = "table"
//! ```

use crate::common::OutputFormat;
use anyhow::{anyhow, Context, Result};
use reach_core::{ArcAngle, ProtectionSettings, SettingsError, DEFAULT_ZONE1_PERCENT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReachConfig {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Calculation settings used when neither the snapshot nor the command line
/// sets them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_zone1_percent")]
    pub zone1_percent: i64,
    #[serde(default)]
    pub arc_angle: ArcAngle,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            zone1_percent: default_zone1_percent(),
            arc_angle: ArcAngle::default(),
        }
    }
}

fn default_zone1_percent() -> i64 {
    i64::from(DEFAULT_ZONE1_PERCENT)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl ReachConfig {
    pub fn protection_settings(&self) -> Result<ProtectionSettings, SettingsError> {
        ProtectionSettings::new(self.defaults.zone1_percent, self.defaults.arc_angle)
    }

    pub fn log_level(&self) -> Result<tracing::Level> {
        self.logging
            .level
            .parse()
            .map_err(|_| anyhow!("invalid log level '{}'", self.logging.level))
    }
}

/// `$REACH_HOME`, or `~/.reach` when unset
pub fn reach_home() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os("REACH_HOME") {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir()
        .ok_or_else(|| anyhow!("Cannot determine home directory"))
        .map(|h| h.join(".reach"))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(reach_home()?.join("config.toml"))
}

pub fn load_config() -> Result<ReachConfig> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<ReachConfig> {
    if !path.exists() {
        return Ok(ReachConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, ReachConfig::default());
        assert_eq!(config.protection_settings().unwrap(), ProtectionSettings::default());
        assert_eq!(config.log_level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\narc_angle = 75\n\n[output]\nformat = \"json\"\n").unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.arc_angle, ArcAngle::Deg75);
        assert_eq!(config.defaults.zone1_percent, 85);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn rejects_bad_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\narc_angle = 50\n").unwrap();
        assert!(load_config_from(&path).is_err());

        let config = ReachConfig {
            defaults: DefaultsConfig {
                zone1_percent: 150,
                arc_angle: ArcAngle::Deg60,
            },
            ..ReachConfig::default()
        };
        assert!(config.protection_settings().is_err());
    }
}
