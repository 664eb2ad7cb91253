//! Token endpoint interaction
//!
//! A single `POST {base_url}/auth` with the identity as a JSON body. The
//! evaluation API issues a fresh access token on every successful call; there
//! is no refresh token.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::identity::Identity;

/// Response from the token endpoint.
///
/// `expires_in` may be an absolute epoch value or a lifetime in seconds; see
/// [`crate::resolve_expiry`].
#[derive(Debug, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Request a new access token for `identity`.
pub async fn request_token(
    client: &reqwest::Client,
    auth_url: &str,
    identity: &Identity,
    timeout: Duration,
) -> Result<TokenResponse> {
    let response = client
        .post(auth_url)
        .json(&identity.auth_request())
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| Error::Http(format!("token request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::TokenExchange(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let token = response
        .json::<TokenResponse>()
        .await
        .map_err(|e| Error::TokenExchange(format!("invalid token response: {e}")))?;

    if token.access_token.is_empty() {
        return Err(Error::TokenExchange(
            "token response has an empty access_token".into(),
        ));
    }

    Ok(token)
}
