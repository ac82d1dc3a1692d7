//! Configuration file for catalogctl
//!
//! Profiles are stored in TOML:
//!
//! ```toml
//! default_profile = "prod"
//!
//! [profiles.prod]
//! server_url = "manage.prod.example.com:27040"
//! region = "us-west-1"
//! cluster = "prod"
//! tls_enabled = true
//! ca_file = "~/.catalogctl/ca.pem"
//! cert_file = "~/.catalogctl/client.pem"
//! key_file = "${CATALOGCTL_KEY_FILE}"
//! wait_timeout_secs = 900
//! ```
//!
//! Command-line flags and environment variables override profile values.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Profile used when none is named on the command line
    #[serde(default)]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Connection defaults for one management service
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Profile {
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub cluster: Option<String>,
    #[serde(default)]
    pub tls_enabled: Option<bool>,
    #[serde(default)]
    pub ca_file: Option<String>,
    #[serde(default)]
    pub cert_file: Option<String>,
    #[serde(default)]
    pub key_file: Option<String>,
    /// Initialization wait budget in seconds
    #[serde(default)]
    pub wait_timeout_secs: Option<u64>,
    /// Seconds between initialization checks
    #[serde(default)]
    pub wait_interval_secs: Option<u64>,
    /// Per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path; a missing file is an empty config
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            debug!("No config file at {}", config_path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        let expanded_content = Self::expand_env_vars(&content);
        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Platform-specific path of the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "catalogctl", "catalogctl")
            .ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Pick the profile for this invocation
    ///
    /// An explicit name must exist. Otherwise `default_profile` is used, then the
    /// only profile if exactly one is configured. No profiles means `None`.
    pub fn resolve_profile(&self, explicit_profile: Option<&str>) -> Result<Option<&Profile>> {
        let name = match explicit_profile.or(self.default_profile.as_deref()) {
            Some(name) => name,
            None if self.profiles.len() == 1 => {
                return Ok(self.profiles.values().next());
            }
            None => return Ok(None),
        };

        self.profiles
            .get(name)
            .map(Some)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Expand `${VAR}` and `${VAR:-default}` references, leaving unknown ones as-is
    fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}
