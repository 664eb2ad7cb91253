//! Configuration types and loading
//!
//! Server and upstream sections are shared with the other service; only the
//! window is specific here. Identity fields and any preloaded credential come
//! only from the environment, never from the TOML file.

use std::path::Path;

use common::config::{Lookup, ServerConfig, UpstreamConfig, read_toml, require_positive};
use eval_auth::{Credential, Identity, now_millis};
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 9876;

/// Budget for one number fetch, including the elapsed-time check
pub const DEFAULT_TIMEOUT_MS: u64 = 500;

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig<DEFAULT_PORT>,
    #[serde(default)]
    pub upstream: UpstreamConfig<DEFAULT_TIMEOUT_MS>,
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(skip)]
    pub identity: Identity,
    #[serde(skip)]
    pub credential: Option<Credential>,
}

#[derive(Debug, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_size")]
    pub size: usize,
}

fn default_window_size() -> usize {
    10
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            size: default_window_size(),
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file, then overlay `lookup`.
    pub fn load(path: Option<&Path>, lookup: Lookup<'_>) -> common::Result<Self> {
        let mut config: Config = read_toml(path)?;

        config.server.apply_env(lookup)?;
        config.upstream.apply_env(lookup);
        config.identity = Identity::from_lookup(lookup);
        config.credential = Credential::from_lookup(lookup, now_millis());

        config.server.validate()?;
        config.upstream.validate()?;
        require_positive("window size", config.window.size as u64)?;
        Ok(config)
    }
}
