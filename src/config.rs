//! Bridge and embedded runtime configuration.
//!
//! Configuration is plain JSON. Every field has a default, so an empty object
//! (or no file at all) yields [`BridgeConfig::default`].

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming a JSON configuration file.
pub const CONFIG_ENV: &str = "EMBRIDGE_CONFIG";

const DEFAULT_MAX_ARGUMENTS: usize = 16;
const MAX_ARGUMENTS_LIMIT: usize = 256;
const DEFAULT_GC_THRESHOLD: usize = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings of the bridge itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Slots of a call's argument buffer, the call target included.
    pub max_arguments: usize,
    /// Do not run the embedded startup sequence; the runtime was started
    /// independently before being handed to the bridge.
    pub skip_runtime_startup: bool,
    pub runtime: RuntimeConfig,
}

/// Settings forwarded to the embedded runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Record raise locations and unwound frames into exception backtraces.
    pub record_backtrace: bool,
    /// Allocations between two automatic collections.
    pub gc_threshold: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            max_arguments: DEFAULT_MAX_ARGUMENTS,
            skip_runtime_startup: false,
            runtime: RuntimeConfig::default(),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            record_backtrace: true,
            gc_threshold: DEFAULT_GC_THRESHOLD,
        }
    }
}

impl BridgeConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Loads the file named by `EMBRIDGE_CONFIG`, or the defaults when the
    /// variable is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::from_path(PathBuf::from(path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // A method call needs two slots: the method and its receiver.
        if self.max_arguments < 2 || self.max_arguments > MAX_ARGUMENTS_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_arguments must be within 2..={}, got {}",
                MAX_ARGUMENTS_LIMIT, self.max_arguments
            )));
        }
        if self.runtime.gc_threshold == 0 {
            return Err(ConfigError::Invalid(
                "runtime.gc_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
