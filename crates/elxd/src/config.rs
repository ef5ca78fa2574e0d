//! Configuration management for elxd.
//!
//! Loads settings from a TOML file, falling back to defaults when the file is
//! missing. Command-line flags and `ELXD_*` environment variables override
//! individual values afterwards.

use crate::api::OcpConfig;
use crate::collector::CollectorOptions;
use anyhow::Result;
use elx_common::resolve::FORMALDEHYDE_MOLECULAR_WEIGHT;
use elx_common::{FanSpeedTable, AIR_PURIFIER};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/elxd/config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Cloud API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: String,

    /// Bearer token for the account
    #[serde(default)]
    pub access_token: String,

    /// Deadline for the API calls of one collection pass
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.ocp.electrolux.one".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            access_token: String::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Molecular weight of gas in g/mol, used for TVOC ppb to μg/m^3
    /// conversion. Formaldehyde is 30.026 g/mol.
    #[serde(default = "default_molecular_weight")]
    pub voc_molecular_weight: f64,

    #[serde(default = "default_device_type")]
    pub supported_device_type: String,
}

fn default_molecular_weight() -> f64 {
    FORMALDEHYDE_MOLECULAR_WEIGHT
}

fn default_device_type() -> String {
    AIR_PURIFIER.to_string()
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            voc_molecular_weight: default_molecular_weight(),
            supported_device_type: default_device_type(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub collector: CollectorConfig,

    /// Extra or replacement model entries for the fan speed table
    #[serde(default)]
    pub fan_speed_max: BTreeMap<String, u32>,
}

impl Config {
    /// Load config from `path`, or defaults if the file does not exist.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        if !Path::new(path).exists() {
            warn!("Config {} not found, using defaults", path);
            return Ok(Config::default());
        }
        Self::load_from_path(path)
    }

    fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        info!("Loaded config from {}", path);
        Ok(config)
    }

    /// Save default config to path
    pub fn save_default(path: &str) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())?;
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        info!("Saved default config to {}", path);
        Ok(())
    }

    /// Molecular weight to use, falling back to formaldehyde for
    /// non-positive or non-finite values.
    pub fn molecular_weight(&self) -> f64 {
        let mw = self.collector.voc_molecular_weight;
        if mw.is_finite() && mw > 0.0 {
            mw
        } else {
            warn!(
                "Invalid VOC molecular weight {}, using {}",
                mw, FORMALDEHYDE_MOLECULAR_WEIGHT
            );
            FORMALDEHYDE_MOLECULAR_WEIGHT
        }
    }

    pub fn fan_speeds(&self) -> FanSpeedTable {
        for (model, max) in &self.fan_speed_max {
            if *max == 0 {
                warn!("Ignoring fan speed entry {} with zero maximum", model);
            }
        }
        FanSpeedTable::with_overrides(&self.fan_speed_max)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.request_timeout_secs.max(1))
    }

    pub fn collector_options(&self) -> CollectorOptions {
        CollectorOptions {
            molecular_weight: self.molecular_weight(),
            device_type: self.collector.supported_device_type.clone(),
            fan_speeds: self.fan_speeds(),
            pass_timeout: self.request_timeout(),
        }
    }

    pub fn ocp_config(&self) -> Result<OcpConfig, ConfigError> {
        if self.api.api_key.is_empty() {
            return Err(ConfigError::Missing("api.api_key"));
        }
        if self.api.access_token.is_empty() {
            return Err(ConfigError::Missing("api.access_token"));
        }
        Ok(OcpConfig {
            base_url: self.api.base_url.clone(),
            api_key: self.api.api_key.clone(),
            access_token: self.api.access_token.clone(),
            timeout: self.request_timeout(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.api.request_timeout_secs, 30);
        assert_eq!(config.collector.voc_molecular_weight, 30.026);
        assert_eq!(config.collector.supported_device_type, "AIR_PURIFIER");
        assert!(config.fan_speed_max.is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[server]
listen_addr = "127.0.0.1:9101"

[api]
api_key = "key"
access_token = "token"

[collector]
voc_molecular_weight = 78.11

[fan_speed_max]
PUREA14 = 7
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen_addr, "127.0.0.1:9101");
        assert_eq!(config.collector.voc_molecular_weight, 78.11);
        // Defaults for missing fields
        assert_eq!(config.api.base_url, "https://api.ocp.electrolux.one");
        assert_eq!(config.collector.supported_device_type, "AIR_PURIFIER");

        let options = config.collector_options();
        assert_eq!(options.fan_speeds.max_for("PUREA14"), Some(7));
        assert_eq!(options.fan_speeds.max_for("PUREA9"), Some(9));
    }

    #[test]
    fn test_invalid_molecular_weight_falls_back() {
        let mut config = Config::default();
        config.collector.voc_molecular_weight = 0.0;
        assert_eq!(config.molecular_weight(), FORMALDEHYDE_MOLECULAR_WEIGHT);

        config.collector.voc_molecular_weight = f64::NAN;
        assert_eq!(config.molecular_weight(), FORMALDEHYDE_MOLECULAR_WEIGHT);
    }

    #[test]
    fn test_ocp_config_requires_credentials() {
        let mut config = Config::default();
        assert!(matches!(
            config.ocp_config(),
            Err(ConfigError::Missing("api.api_key"))
        ));

        config.api.api_key = "key".to_string();
        assert!(matches!(
            config.ocp_config(),
            Err(ConfigError::Missing("api.access_token"))
        ));

        config.api.access_token = "token".to_string();
        let ocp = config.ocp_config().unwrap();
        assert_eq!(ocp.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.listen_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[collector]\nsupported_device_type = \"DEHUMIDIFIER\"").unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.collector.supported_device_type, "DEHUMIDIFIER");
    }

    #[test]
    fn test_load_invalid_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nlisten_addr = 1").unwrap();

        let err = Config::load(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_save_default_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elxd").join("config.toml");
        let path = path.to_str().unwrap();

        Config::save_default(path).unwrap();
        let config = Config::load(path).unwrap();
        assert_eq!(config.api.request_timeout_secs, 30);
    }
}
