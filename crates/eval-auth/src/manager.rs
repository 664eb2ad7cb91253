//! Cached credential with best-effort refresh
//!
//! The manager owns the single credential for the process. A held credential
//! is reused until it expires; after that the token endpoint is called again.
//! If that call fails, the expired credential is still returned, since the
//! evaluation API may keep accepting it. Only when nothing was ever obtained
//! does the caller see `AuthFailure`.

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::constants::{AUTH_PATH, DEFAULT_AUTH_TIMEOUT_MS};
use crate::credentials::{Credential, now_millis, resolve_expiry};
use crate::error::{Error, Result};
use crate::identity::Identity;
use crate::token::request_token;

/// Snapshot of the held credential, without the token itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialStatus {
    pub token_exists: bool,
    /// Expiration as unix timestamp in milliseconds, if a credential is held
    pub expires_at: Option<u64>,
}

/// Owner of the process-wide evaluation API credential.
///
/// The Mutex is held across a refresh so concurrent callers wait for one
/// token request instead of each issuing their own.
pub struct TokenManager {
    client: reqwest::Client,
    auth_url: String,
    identity: Identity,
    timeout: Duration,
    held: Mutex<Option<Credential>>,
}

impl TokenManager {
    pub fn new(client: reqwest::Client, base_url: &str, identity: Identity) -> Self {
        Self {
            client,
            auth_url: format!("{}/{AUTH_PATH}", base_url.trim_end_matches('/')),
            identity,
            timeout: Duration::from_millis(DEFAULT_AUTH_TIMEOUT_MS),
            held: Mutex::new(None),
        }
    }

    /// Seed the manager with a credential issued before this process started.
    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.held = Mutex::new(credential);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Return an `Authorization` header value, refreshing if needed.
    pub async fn authorization_header(&self) -> Result<String> {
        self.authorization_header_at(now_millis()).await
    }

    async fn authorization_header_at(&self, now: u64) -> Result<String> {
        let mut held = self.held.lock().await;

        if let Some(credential) = held.as_ref().filter(|c| c.is_valid_at(now)) {
            debug!("using cached credential");
            return Ok(credential.header_value());
        }

        debug!(url = %self.auth_url, "requesting new credential");
        match request_token(&self.client, &self.auth_url, &self.identity, self.timeout).await {
            Ok(token) => {
                let credential = Credential::new(
                    token.access_token,
                    token.token_type,
                    resolve_expiry(token.expires_in, now),
                );
                info!(expires_at = credential.expires_at, "obtained new credential");
                let header = credential.header_value();
                *held = Some(credential);
                Ok(header)
            }
            Err(e) => match held.as_ref() {
                Some(stale) => {
                    warn!(
                        error = %e,
                        expired_at = stale.expires_at,
                        "credential refresh failed, reusing expired credential"
                    );
                    Ok(stale.header_value())
                }
                None => Err(Error::AuthFailure(e.to_string())),
            },
        }
    }

    /// Report whether a credential is held and when it expires.
    pub async fn status(&self) -> CredentialStatus {
        let held = self.held.lock().await;
        CredentialStatus {
            token_exists: held.is_some(),
            expires_at: held.as_ref().map(|c| c.expires_at),
        }
    }
}
