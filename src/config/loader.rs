// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_CONFIGURATION_PROFILE_NAME, DEFAULT_INSTALLER_HOSTNAME, DEFAULT_LOG_LEVEL,
    DEFAULT_MAX_DELIVERY_ATTEMPTS, DEFAULT_MAX_EVENT_DEPTH, DEFAULT_RETRY_BACKOFF_MS,
    DEFAULT_WORKER_COUNT, PROVISIONING_TIMEOUT_SECS,
};
use crate::errors::ConfigError;
use crate::observability::messages::config::{ConfigLoaded, ValidationFailed};
use crate::observability::messages::StructuredLog;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for the orchestration engine.
///
/// Every section is optional; an empty file yields a runnable in-memory
/// engine with no resource adapters.
///
/// # Example
/// ```yaml
/// logging:
///   level: debug
/// workers:
///   count: 8
///   max_delivery_attempts: 3
///   retry_backoff_ms: 500
/// dispatcher:
///   max_event_depth: 16
/// watchdog:
///   provisioning_timeout_seconds: 600
/// actions:
///   default_profile: Default
/// store:
///   kind: json_file
///   directory: /var/lib/flotilla
/// installer:
///   hostname: installer.cluster.local
///   ip_address: 10.0.0.1
/// adapters:
///   - name: local
///     type: local
///     instances: [compute-01, compute-02]
///     profiles:
///       Default:
///         cloud_init_script_template: /etc/flotilla/bootstrap.tmpl
///         dns_domain: cluster.local
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub workers: WorkerConfig,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub watchdog: WatchdogConfig,
    #[serde(default)]
    pub actions: ActionsConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub installer: InstallerConfig,
    #[serde(default)]
    pub adapters: Vec<AdapterConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Worker pool sizing and the substrate redelivery policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub count: usize,
    /// Total attempts per delivery, the first one included
    pub max_delivery_attempts: u32,
    pub retry_backoff_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_WORKER_COUNT,
            max_delivery_attempts: DEFAULT_MAX_DELIVERY_ATTEMPTS,
            retry_backoff_ms: DEFAULT_RETRY_BACKOFF_MS,
        }
    }
}

impl WorkerConfig {
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    pub max_event_depth: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_event_depth: DEFAULT_MAX_EVENT_DEPTH,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    pub provisioning_timeout_seconds: u64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            provisioning_timeout_seconds: PROVISIONING_TIMEOUT_SECS,
        }
    }
}

impl WatchdogConfig {
    pub fn provisioning_timeout(&self) -> Duration {
        Duration::from_secs(self.provisioning_timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Profile handed to a capability when the action names none
    pub default_profile: String,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            default_profile: DEFAULT_CONFIGURATION_PROFILE_NAME.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    #[default]
    Memory,
    JsonFile,
}

/// Where action and node records live.
///
/// A `json_file` store keeps `actions.json` and `nodes.json` in `directory`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// The provisioning installer that new instances call home to.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    pub hostname: String,
    pub ip_address: Option<String>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            hostname: DEFAULT_INSTALLER_HOSTNAME.to_string(),
            ip_address: None,
        }
    }
}

/// Free-form settings of one adapter profile.
pub type ProfileSettings = BTreeMap<String, serde_json::Value>;

/// Configuration for a single resource adapter.
///
/// # Example
/// ```yaml
/// name: local
/// type: local
/// instances: [compute-01]
/// profiles:
///   Default:
///     dns_domain: cluster.local
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AdapterConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub adapter_type: AdapterType,
    #[serde(default)]
    pub profiles: HashMap<String, ProfileSettings>,
    /// Instances known to the adapter at startup (local adapter)
    #[serde(default)]
    pub instances: Vec<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdapterType {
    Local,
}

/// Load a config from a YAML file, or TOML if the extension is `.toml`
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        Ok(toml::from_str(&content)?)
    } else if content.trim().is_empty() {
        Ok(Config::default())
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Load a config file and reject it if validation finds any problem.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(&path)?;

    if let Err(errors) = crate::config::validate_config(&cfg) {
        tracing::error!(
            "{}",
            ValidationFailed {
                error_count: errors.len()
            }
        );
        return Err(ConfigError::Validation(errors));
    }

    ConfigLoaded {
        path: &path.as_ref().display().to_string(),
        adapter_count: cfg.adapters.len(),
        worker_count: cfg.workers.count,
    }
    .log();

    Ok(cfg)
}
