//! Upstream fetch errors

/// Why a call to the evaluation API produced no usable payload.
///
/// Every variant means "upstream unavailable" to the services: they resolve
/// it to fallback data and never surface it to their own HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no credential for upstream call: {0}")]
    Auth(#[from] eval_auth::Error),

    #[error("upstream call exceeded {limit_ms}ms (took {elapsed_ms}ms)")]
    Timeout { elapsed_ms: u64, limit_ms: u64 },

    #[error("upstream request failed: {0}")]
    Network(String),

    #[error("upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid upstream payload: {0}")]
    Decode(String),
}

impl FetchError {
    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Auth(_) => "auth",
            FetchError::Timeout { .. } => "timeout",
            FetchError::Network(_) => "network",
            FetchError::Status { .. } => "status",
            FetchError::Decode(_) => "decode",
        }
    }
}
