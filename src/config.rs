//! Process configuration.
//!
//! Values come from an optional YAML file named by `A2A_BRIDGE_CONFIG`,
//! then from individual environment overrides. Anything unset falls back to
//! the defaults below.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::a2a::transports::http::DEFAULT_TIMEOUT_SECS;
use crate::utilities::paths::{default_storage_dir, STORAGE_DIR_ENV};

/// Path of the YAML config file.
pub const CONFIG_PATH_ENV: &str = "A2A_BRIDGE_CONFIG";
/// `1`/`true`/`yes`/`on` answers every task locally.
pub const MOCK_ENV: &str = "A2A_BRIDGE_MOCK";
/// `stdio` or `http`.
pub const FRONTEND_ENV: &str = "A2A_BRIDGE_FRONTEND";
/// Listen address for the HTTP front end.
pub const BIND_ENV: &str = "A2A_BRIDGE_BIND";
/// Outbound request timeout in seconds.
pub const TIMEOUT_ENV: &str = "A2A_BRIDGE_TIMEOUT_SECS";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {key}: '{value}' ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Which MCP front end the binary serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontendTransport {
    /// Newline-delimited JSON-RPC on stdin/stdout.
    #[default]
    Stdio,
    /// JSON-RPC and REST routes over HTTP.
    Http,
}

impl FromStr for FrontendTransport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            _ => Err(ConfigError::invalid(FRONTEND_ENV, s, "expected 'stdio' or 'http'")),
        }
    }
}

impl std::fmt::Display for FrontendTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Directory holding agent record files.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    /// Answer task requests locally instead of calling agents.
    #[serde(default)]
    pub mock_mode: bool,
    #[serde(default)]
    pub frontend: FrontendTransport,
    /// Listen address for the HTTP front end.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
    /// Timeout for card fetches and task requests.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            mock_mode: false,
            frontend: FrontendTransport::default(),
            bind_addr: default_bind_addr(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BridgeConfig {
    /// Resolve the configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration using `lookup` for environment variables.
    pub fn load_with<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::from_file(path.trim())?,
            None => Self::default(),
        };
        config.apply_overrides(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a YAML config file. Missing keys take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(STORAGE_DIR_ENV) {
            self.storage_dir = PathBuf::from(dir.trim());
        }
        if let Some(value) = get(MOCK_ENV) {
            self.mock_mode = parse_flag(MOCK_ENV, &value)?;
        }
        if let Some(value) = get(FRONTEND_ENV) {
            self.frontend = value.parse()?;
        }
        if let Some(value) = get(BIND_ENV) {
            self.bind_addr = value
                .trim()
                .parse()
                .map_err(|e: std::net::AddrParseError| ConfigError::invalid(BIND_ENV, &value, e.to_string()))?;
        }
        if let Some(value) = get(TIMEOUT_ENV) {
            self.request_timeout_secs = value
                .trim()
                .parse()
                .map_err(|e: std::num::ParseIntError| ConfigError::invalid(TIMEOUT_ENV, &value, e.to_string()))?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "request_timeout_secs",
                "0",
                "must be at least 1",
            ));
        }
        if self.storage_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("storage_dir", "", "must not be empty"));
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected a boolean")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::load_with(env(&[(STORAGE_DIR_ENV, "/tmp/agents")])).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/tmp/agents"));
        assert!(!config.mock_mode);
        assert_eq!(config.frontend, FrontendTransport::Stdio);
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides() {
        let config = BridgeConfig::load_with(env(&[
            (STORAGE_DIR_ENV, "/srv/agents"),
            (MOCK_ENV, "Yes"),
            (FRONTEND_ENV, "HTTP"),
            (BIND_ENV, "0.0.0.0:9000"),
            (TIMEOUT_ENV, "5"),
        ]))
        .unwrap();
        assert!(config.mock_mode);
        assert_eq!(config.frontend, FrontendTransport::Http);
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            (MOCK_ENV, "maybe"),
            (FRONTEND_ENV, "grpc"),
            (BIND_ENV, "not-an-address"),
            (TIMEOUT_ENV, "soon"),
            (TIMEOUT_ENV, "0"),
        ];
        for (key, value) in cases {
            let err = BridgeConfig::load_with(env(&[(key, value)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { .. }), "{}={}", key, value);
        }
    }

    #[test]
    fn test_yaml_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.yaml");
        std::fs::write(
            &path,
            "storage_dir: /data/agents\nmock_mode: true\nfrontend: http\n",
        )
        .unwrap();
        let path_str = path.to_string_lossy().to_string();

        let config = BridgeConfig::load_with(env(&[(CONFIG_PATH_ENV, path_str.as_str())])).unwrap();
        assert_eq!(config.storage_dir, PathBuf::from("/data/agents"));
        assert!(config.mock_mode);
        assert_eq!(config.frontend, FrontendTransport::Http);
        assert_eq!(config.request_timeout_secs, 30);

        let config = BridgeConfig::load_with(env(&[
            (CONFIG_PATH_ENV, path_str.as_str()),
            (MOCK_ENV, "off"),
        ]))
        .unwrap();
        assert!(!config.mock_mode);
    }

    #[test]
    fn test_bad_or_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        let err = BridgeConfig::from_file(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));

        let bad = dir.path().join("bad.yaml");
        std::fs::write(&bad, "frontend: [unclosed").unwrap();
        let err = BridgeConfig::from_file(&bad).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
