//! Tool configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use axm_utils::LogFormat;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Settings of the offline referral tool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Directory of the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in megabytes.
    #[serde(default = "default_map_size_mb")]
    pub map_size_mb: usize,

    /// Log level filter, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Account allowed to change params.
    #[serde(default = "default_authority")]
    pub authority: String,

    /// Module account that receives coins before burning.
    #[serde(default = "default_module_account")]
    pub module_account: String,

    #[serde(default = "default_bond_denom")]
    pub bond_denom: String,

    /// Required address prefix; empty accepts any address.
    #[serde(default)]
    pub address_prefix: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./referral_data")
}

fn default_map_size_mb() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_authority() -> String {
    "gov".to_string()
}

fn default_module_account() -> String {
    axm_referral::keeper::DEFAULT_MODULE_ACCOUNT.to_string()
}

fn default_bond_denom() -> String {
    "uaxm".to_string()
}

impl DaemonConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn map_size_bytes(&self) -> usize {
        self.map_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size_mb: default_map_size_mb(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            authority: default_authority(),
            module_account: default_module_account(),
            bond_denom: default_bond_denom(),
            address_prefix: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = DaemonConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(DaemonConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").unwrap();
        assert_eq!(config, DaemonConfig::default());
        assert_eq!(config.module_account, "referral");
    }

    #[test]
    fn partial_toml_overrides() {
        let config = DaemonConfig::from_toml_str(
            r#"
            map_size_mb = 16
            log_format = "json"
            address_prefix = "axm1"
            "#,
        )
        .unwrap();
        assert_eq!(config.map_size_bytes(), 16 * 1024 * 1024);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.address_prefix, "axm1");
        assert_eq!(config.bond_denom, "uaxm");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = DaemonConfig::from_toml_file(Path::new("/nonexistent/referral.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
