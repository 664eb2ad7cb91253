//! Evaluation API constants
//!
//! Endpoint layout and defaults for the remote evaluation service. None of
//! these are secrets; the identity and bearer tokens come from the environment.

pub use common::config::{DEFAULT_AUTH_TIMEOUT_MS, DEFAULT_BASE_URL};

/// Path of the token endpoint, relative to the base URL
pub const AUTH_PATH: &str = "auth";

/// Scheme used when the token endpoint omits `token_type`
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// Lifetime assumed when the token endpoint omits `expires_in` (1 hour)
pub const DEFAULT_TOKEN_LIFETIME_MILLIS: u64 = 3_600_000;

/// `expires_in` values at or above this are absolute unix milliseconds
pub(crate) const ABSOLUTE_MILLIS_THRESHOLD: u64 = 1_000_000_000_000;

/// `expires_in` values at or above this (and below the millis threshold) are
/// absolute unix seconds
pub(crate) const ABSOLUTE_SECS_THRESHOLD: u64 = 1_000_000_000;
