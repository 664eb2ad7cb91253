//! Shared configuration loading
//!
//! The `--config` flag (or `CONFIG_PATH`) only picks the TOML file. Values
//! come from built-in defaults, then the file, then environment variables.
//! Environment access goes through a `Lookup` so tests can supply variables
//! without mutating the real process environment.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Default base URL of the remote evaluation API
pub const DEFAULT_BASE_URL: &str = "http://20.244.56.144/evaluation-service";

/// Timeout for the `POST /auth` call
pub const DEFAULT_AUTH_TIMEOUT_MS: u64 = 5_000;

pub const DEFAULT_MAX_CONNECTIONS: usize = 1000;

/// Inbound HTTP settings. `PORT` is the service's default listen port.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, bound(deserialize = ""))]
pub struct ServerConfig<const PORT: u16> {
    pub listen_addr: SocketAddr,
    pub max_connections: usize,
}

impl<const PORT: u16> Default for ServerConfig<PORT> {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], PORT)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl<const PORT: u16> ServerConfig<PORT> {
    /// `PORT` replaces the port of `listen_addr`.
    pub fn apply_env(&mut self, lookup: Lookup<'_>) -> Result<()> {
        if let Some(port) = parse_var::<u16>(lookup, "PORT")? {
            self.listen_addr.set_port(port);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("max_connections", self.max_connections as u64)
    }
}

/// Evaluation API settings. `TIMEOUT_MS` is the service's default budget for
/// one data fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, bound(deserialize = ""))]
pub struct UpstreamConfig<const TIMEOUT_MS: u64> {
    pub base_url: String,
    pub timeout_ms: u64,
    pub auth_timeout_ms: u64,
}

impl<const TIMEOUT_MS: u64> Default for UpstreamConfig<TIMEOUT_MS> {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: TIMEOUT_MS,
            auth_timeout_ms: DEFAULT_AUTH_TIMEOUT_MS,
        }
    }
}

impl<const TIMEOUT_MS: u64> UpstreamConfig<TIMEOUT_MS> {
    /// `EVALUATION_BASE_URL` replaces `base_url`.
    pub fn apply_env(&mut self, lookup: Lookup<'_>) {
        if let Some(base_url) = lookup("EVALUATION_BASE_URL") {
            self.base_url = base_url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_base_url(&self.base_url)?;
        require_positive("timeout_ms", self.timeout_ms)?;
        require_positive("auth_timeout_ms", self.auth_timeout_ms)
    }
}

/// Reject a zero value for a setting that must be positive.
pub fn require_positive(name: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(Error::Config(format!("{name} must be greater than 0")));
    }
    Ok(())
}

/// Source of environment-style variables.
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Read a variable from the process environment.
///
/// Empty and whitespace-only values are treated as unset.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Parse an optional variable into `T`, rejecting unparseable values.
pub fn parse_var<T: FromStr>(lookup: Lookup<'_>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| Error::InvalidVar {
                key: key.to_owned(),
                value: raw,
            }),
    }
}

/// Resolve the config file path from the CLI arg or `CONFIG_PATH`.
///
/// Returns `None` when neither is set; the service then runs on defaults.
pub fn resolve_path(cli_path: Option<&str>, lookup: Lookup<'_>) -> Option<PathBuf> {
    if let Some(p) = cli_path {
        return Some(PathBuf::from(p));
    }
    lookup("CONFIG_PATH").map(PathBuf::from)
}

/// Deserialize a TOML file, or return `T::default()` when no path is given.
pub fn read_toml<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        }
        None => Ok(T::default()),
    }
}

/// Reject base URLs that are not absolute http(s) URLs.
pub fn validate_base_url(url: &str) -> Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::Config(format!(
            "base_url must start with http:// or https://, got: {url}"
        )));
    }
    Ok(())
}

/// Extract the `--config <path>` flag from process arguments.
pub fn cli_config_arg(args: &[String]) -> Option<&str> {
    args.iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
