//! Configuration types and loading
//!
//! Server and upstream sections are shared with the other service; the
//! `[source]` section controls caching and offline mode. Identity fields and
//! any preloaded credential come only from the environment.

use std::path::Path;

use common::config::{Lookup, ServerConfig, UpstreamConfig, read_toml, require_positive};
use eval_auth::{Credential, Identity, now_millis};
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Root configuration
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig<DEFAULT_PORT>,
    #[serde(default)]
    pub upstream: UpstreamConfig<DEFAULT_TIMEOUT_MS>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(skip)]
    pub identity: Identity,
    #[serde(skip)]
    pub credential: Option<Credential>,
}

/// Where users, posts and comments are read from
#[derive(Debug, Deserialize)]
pub struct SourceConfig {
    /// How long a non-empty upstream result is reused
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// Serve the built-in mock table without contacting the evaluation API
    #[serde(default)]
    pub offline: bool,
}

fn default_cache_ttl_secs() -> u64 {
    60
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
            offline: false,
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
        require_positive("cache_ttl_secs", config.source.cache_ttl_secs)?;
        Ok(config)
    }
}
