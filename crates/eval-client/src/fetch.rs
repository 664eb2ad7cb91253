//! Authorized, time-bounded GETs against the evaluation API
//!
//! `fetch` returns a typed `Result` so failure paths stay visible; `fetch_or`
//! is the policy both services use: log, count, and substitute a
//! caller-supplied fallback payload. There is exactly one attempt per call;
//! no retry and no backoff.

use std::sync::Arc;
use std::time::{Duration, Instant};

use eval_auth::TokenManager;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::error::FetchError;

/// HTTP client for evaluation API data endpoints.
pub struct Fetcher {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenManager>,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(
        client: reqwest::Client,
        base_url: &str,
        tokens: Arc<TokenManager>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
            timeout,
        }
    }

    /// The token manager shared with this fetcher.
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// GET `{base_url}/{endpoint}` and decode the JSON body as `T`.
    ///
    /// The reqwest timeout bounds the call; the wall-clock time measured
    /// around it is checked against the same limit so a response that
    /// completes late is still treated as a timeout.
    #[instrument(skip(self, params), fields(timeout_ms = self.timeout.as_millis() as u64))]
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let authorization = self.tokens.authorization_header().await?;
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));

        let mut request = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .timeout(self.timeout);
        if !params.is_empty() {
            request = request.query(params);
        }

        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e, started))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("<no body>"));
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e, started))?;

        let elapsed = started.elapsed();
        if elapsed > self.timeout {
            return Err(FetchError::Timeout {
                elapsed_ms: elapsed.as_millis() as u64,
                limit_ms: self.timeout.as_millis() as u64,
            });
        }

        debug!(
            elapsed_ms = elapsed.as_millis() as u64,
            bytes = body.len(),
            "upstream call completed"
        );
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Like [`Fetcher::fetch`], but any failure yields `fallback()`.
    pub async fn fetch_or<T, F>(&self, endpoint: &str, params: &[(&str, &str)], fallback: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.fetch(endpoint, params).await {
            Ok(payload) => payload,
            Err(e) => {
                record_fallback(&e);
                warn!(
                    endpoint,
                    error = %e,
                    error_type = e.kind(),
                    "upstream call failed, using fallback payload"
                );
                fallback()
            }
        }
    }

    fn transport_error(&self, e: reqwest::Error, started: Instant) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                elapsed_ms: started.elapsed().as_millis() as u64,
                limit_ms: self.timeout.as_millis() as u64,
            }
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// Count a fallback substitution, labelled by failure kind.
pub fn record_fallback(error: &FetchError) {
    metrics::counter!("upstream_fallbacks_total", "error_type" => error.kind()).increment(1);
}
