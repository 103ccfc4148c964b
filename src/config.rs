//! Configuration file handling
//!
//! Settings live in `config.toml` in the config directory (see
//! [`crate::paths`]). Every field has a default, so a missing file means
//! "all defaults". Manager connection settings can also come from
//! `RESMGR_URL`, `RESMGR_USERNAME`, `RESMGR_PASSWORD` and `RESMGR_TENANT`,
//! which take precedence over the file.

use anyhow::{Context, Result};
use executions::client::rest::RestClient;
use executions::{PollConfig, StatusSets, Timeout, WORKFLOW_EXECUTE_OPERATION};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::paths;

pub const ENV_URL: &str = "RESMGR_URL";
pub const ENV_USERNAME: &str = "RESMGR_USERNAME";
pub const ENV_PASSWORD: &str = "RESMGR_PASSWORD";
pub const ENV_TENANT: &str = "RESMGR_TENANT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub manager: ManagerConfig,
    pub polling: PollingConfig,
    pub execution: ExecutionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant: Option<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost".to_string(),
            username: None,
            password: None,
            tenant: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds to wait for a terminal status, -1 for no limit
    pub timeout: Timeout,
    /// Seconds between status queries
    pub interval: u64,
    pub success_statuses: Vec<String>,
    pub failure_statuses: Vec<String>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        let statuses = StatusSets::default();
        Self {
            timeout: Timeout::default(),
            interval: PollConfig::DEFAULT_INTERVAL_SECS,
            success_statuses: statuses.success,
            failure_statuses: statuses.failure,
        }
    }
}

impl PollingConfig {
    pub fn to_poll_config(&self) -> PollConfig {
        PollConfig::default()
            .with_timeout(self.timeout)
            .with_interval(Duration::from_secs(self.interval))
            .with_statuses(StatusSets::new(
                self.success_statuses.iter().cloned(),
                self.failure_statuses.iter().cloned(),
            ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Workflow used when a command does not name one
    pub workflow: String,
    /// Start executions even if others are running on the deployment
    pub force: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            workflow: WORKFLOW_EXECUTE_OPERATION.to_string(),
            force: true,
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location if it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = paths::config_file()?;
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    log::debug!("No config file at {}, using defaults", path.display());
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load and parse a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Override manager settings from environment-style lookups
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_URL) {
            self.manager.url = url;
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.manager.username = Some(username);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.manager.password = Some(password);
        }
        if let Some(tenant) = lookup(ENV_TENANT) {
            self.manager.tenant = Some(tenant);
        }
    }

    /// Build a REST client for the configured manager
    pub fn rest_client(&self) -> RestClient {
        let mut client = RestClient::new(&self.manager.url);
        if let (Some(user), Some(password)) = (&self.manager.username, &self.manager.password) {
            client = client.with_credentials(user, password);
        }
        if let Some(tenant) = &self.manager.tenant {
            client = client.with_tenant(tenant);
        }
        client
    }
}
