//! # Client Configuration
//!
//! Loaded from a JSON file, then overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `BLADE_RPC_HOST` | `rpc_host` |
//! | `BLADE_RPC_PORT` | `rpc_port` |
//!
//! Field names are snake_case; the camelCase names used by older app
//! configs (`appName`, `artifactDir`, `ctrName`, ...) are accepted as
//! aliases.

use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Condition type registered when the caller does not name one.
pub const DEFAULT_CONDITION: &str = "Sanity";

/// Wire transport to the node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    #[default]
    WebSocket,
    Http,
}

impl Transport {
    pub fn scheme(&self) -> &'static str {
        match self {
            Transport::WebSocket => "ws",
            Transport::Http => "http",
        }
    }
}

/// One contract the app registers with the node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    #[serde(alias = "ctrName")]
    pub ctr_name: String,
    /// Condition types with a script under the condition directory.
    pub conditions: Vec<String>,
}

impl ContractConfig {
    pub fn new(ctr_name: impl Into<String>) -> Self {
        Self {
            ctr_name: ctr_name.into(),
            conditions: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    pub fn has_condition(&self, condition: &str) -> bool {
        self.conditions.iter().any(|c| c == condition)
    }
}

/// Main client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    #[serde(alias = "rpcHost")]
    pub rpc_host: String,
    #[serde(alias = "rpcPort")]
    pub rpc_port: u16,
    pub transport: Transport,
    #[serde(alias = "appName")]
    pub app_name: String,
    pub version: String,
    /// Chain id used for replay-protected signature recovery.
    #[serde(alias = "networkID")]
    pub network_id: u64,
    #[serde(alias = "artifactDir")]
    pub artifact_dir: PathBuf,
    #[serde(alias = "conditionDir")]
    pub condition_dir: PathBuf,
    pub contracts: Vec<ContractConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_host: "127.0.0.1".to_string(),
            rpc_port: 3000,
            transport: Transport::WebSocket,
            app_name: String::new(),
            version: "1.0".to_string(),
            network_id: 1,
            artifact_dir: PathBuf::from("artifacts"),
            condition_dir: PathBuf::from("conditions"),
            contracts: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Load `path`, apply process environment overrides, validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load(path, |key| env::var(key).ok())
    }

    /// [`Self::from_file`] with an explicit variable source.
    pub fn load<F>(path: impl AsRef<Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut config: ClientConfig =
            serde_json::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `BLADE_RPC_HOST` / `BLADE_RPC_PORT` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("BLADE_RPC_HOST") {
            self.rpc_host = host;
        }
        if let Some(port) = lookup("BLADE_RPC_PORT") {
            self.rpc_port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("BLADE_RPC_PORT={port:?}")))?;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::MissingField("app_name"));
        }
        if self.rpc_host.trim().is_empty() {
            return Err(ConfigError::MissingField("rpc_host"));
        }
        if self.rpc_port == 0 {
            return Err(ConfigError::Invalid("rpc_port must be non-zero".to_string()));
        }

        let mut seen = HashSet::new();
        for contract in &self.contracts {
            if contract.ctr_name.trim().is_empty() {
                return Err(ConfigError::MissingField("contracts[].ctr_name"));
            }
            if !seen.insert(contract.ctr_name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "contract {} listed twice",
                    contract.ctr_name
                )));
            }
        }
        Ok(())
    }

    /// Node URL, e.g. `ws://127.0.0.1:3000`.
    pub fn endpoint(&self) -> String {
        format!("{}://{}:{}", self.transport.scheme(), self.rpc_host, self.rpc_port)
    }

    pub fn contract(&self, ctr_name: &str) -> Option<&ContractConfig> {
        self.contracts.iter().find(|c| c.ctr_name == ctr_name)
    }

    /// `<artifact_dir>/<ctr>.json`
    pub fn artifact_path(&self, ctr_name: &str) -> PathBuf {
        self.artifact_dir.join(format!("{ctr_name}.json"))
    }

    /// `<condition_dir>/<app>/<ctr>/<cond_type>.js`
    pub fn condition_path(&self, ctr_name: &str, cond_type: &str) -> PathBuf {
        self.condition_dir
            .join(&self.app_name)
            .join(ctr_name)
            .join(format!("{cond_type}.js"))
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("cannot parse configuration: {0}")]
    Parse(String),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
