//! CLI - Command-line argument parsing
//!
//! Every flag has an `ELXD_*` environment variable counterpart. Flags that are
//! set override the matching config file value.

use crate::config::{Config, CONFIG_PATH};
use clap::Parser;

/// Electrolux appliance Prometheus exporter
#[derive(Parser, Debug)]
#[command(name = "elxd")]
#[command(about = "Exports Electrolux air purifier state as Prometheus metrics", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to config file
    #[arg(long, env = "ELXD_CONFIG", default_value = CONFIG_PATH)]
    pub config: String,

    /// Listen on this address
    #[arg(long, env = "ELXD_LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// API base URL
    #[arg(long, env = "ELXD_API_URL")]
    pub api_url: Option<String>,

    /// API key
    #[arg(long, env = "ELXD_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Bearer access token for the account
    #[arg(long, env = "ELXD_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Molecular weight of gas, in g/mol. Used for TVOC (ppb) conversion to
    /// VOC density (μg/m^3). Formaldehyde is 30.026 g/mol.
    #[arg(long, env = "ELXD_VOC_MOLECULAR_WEIGHT")]
    pub voc_molecular_weight: Option<f64>,

    /// Log filter, e.g. "info" or "elxd=debug"
    #[arg(long, env = "ELXD_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Write a default config file to --config and exit
    #[arg(long)]
    pub init_config: bool,
}

impl Cli {
    /// Apply flag and environment overrides on top of the file config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(addr) = &self.listen_addr {
            config.server.listen_addr = addr.clone();
        }
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(key) = &self.api_key {
            config.api.api_key = key.clone();
        }
        if let Some(token) = &self.access_token {
            config.api.access_token = token.clone();
        }
        if let Some(mw) = self.voc_molecular_weight {
            config.collector.voc_molecular_weight = mw;
        }
    }
}
