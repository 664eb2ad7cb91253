//! Error types for evaluation API authentication

/// Errors from token acquisition.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("token exchange failed: {0}")]
    TokenExchange(String),

    /// No credential could be obtained and none was held to fall back on.
    #[error("no credential available: {0}")]
    AuthFailure(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;
