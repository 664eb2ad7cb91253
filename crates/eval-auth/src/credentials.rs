//! Bearer credential model
//!
//! `expires_at` is a unix timestamp in milliseconds (absolute, not a delta).
//! The token endpoint's `expires_in` is normalized into it by
//! [`resolve_expiry`] when the credential is stored.

use common::Secret;
use common::config::Lookup;

use crate::constants::{
    ABSOLUTE_MILLIS_THRESHOLD, ABSOLUTE_SECS_THRESHOLD, DEFAULT_TOKEN_LIFETIME_MILLIS,
    DEFAULT_TOKEN_TYPE,
};

/// A bearer credential for the evaluation API.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: Secret<String>,
    /// Authorization scheme, normally "Bearer"
    pub token_type: String,
    /// Expiration as unix timestamp in milliseconds
    pub expires_at: u64,
}

impl Credential {
    pub fn new(access_token: String, token_type: Option<String>, expires_at: u64) -> Self {
        Self {
            access_token: Secret::new(access_token),
            token_type: token_type.unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
            expires_at,
        }
    }

    /// Load a previously issued credential from `ACCESS_TOKEN`, `TOKEN_TYPE`
    /// and `EXPIRES_IN`.
    ///
    /// Returns `None` without `ACCESS_TOKEN`. An unparseable `EXPIRES_IN`
    /// yields an already-expired credential: it is still usable as a fallback
    /// but a refresh is attempted first.
    pub fn from_lookup(lookup: Lookup<'_>, now_millis: u64) -> Option<Self> {
        let token = lookup("ACCESS_TOKEN")?;
        let expires_at = match lookup("EXPIRES_IN") {
            Some(raw) => raw
                .parse::<u64>()
                .map(|v| resolve_expiry(Some(v), now_millis))
                .unwrap_or(0),
            None => 0,
        };
        Some(Self::new(token, lookup("TOKEN_TYPE"), expires_at))
    }

    /// Whether the credential is still valid at `now_millis`.
    pub fn is_valid_at(&self, now_millis: u64) -> bool {
        now_millis < self.expires_at
    }

    /// `Authorization` header value: `"{scheme} {token}"`.
    pub fn header_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token.expose())
    }
}

/// Normalize an `expires_in` value into an absolute unix millisecond expiry.
///
/// The evaluation API has been observed returning absolute epoch values
/// rather than a lifetime, so magnitude decides the interpretation:
/// - `>= 10^12`: absolute unix milliseconds
/// - `>= 10^9`: absolute unix seconds
/// - smaller: lifetime in seconds from `now_millis`
/// - absent: one hour from `now_millis`
pub fn resolve_expiry(expires_in: Option<u64>, now_millis: u64) -> u64 {
    match expires_in {
        Some(v) if v >= ABSOLUTE_MILLIS_THRESHOLD => v,
        Some(v) if v >= ABSOLUTE_SECS_THRESHOLD => v.saturating_mul(1000),
        Some(v) => now_millis.saturating_add(v.saturating_mul(1000)),
        None => now_millis.saturating_add(DEFAULT_TOKEN_LIFETIME_MILLIS),
    }
}

/// Current wall-clock time as unix milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: u64 = 1_743_574_000_000;

    #[test]
    fn header_value_joins_scheme_and_token() {
        let credential = Credential::new("eyJhbGciOi".into(), None, NOW + 1000);
        assert_eq!(credential.header_value(), "Bearer eyJhbGciOi");

        let custom = Credential::new("abc".into(), Some("Token".into()), NOW + 1000);
        assert_eq!(custom.header_value(), "Token abc");
    }

    #[test]
    fn validity_is_strictly_before_expiry() {
        let credential = Credential::new("t".into(), None, NOW);
        assert!(credential.is_valid_at(NOW - 1));
        assert!(!credential.is_valid_at(NOW));
        assert!(!credential.is_valid_at(NOW + 1));
    }

    #[test]
    fn resolve_expiry_absolute_millis() {
        assert_eq!(resolve_expiry(Some(1_743_574_344_000), NOW), 1_743_574_344_000);
    }

    #[test]
    fn resolve_expiry_absolute_seconds() {
        assert_eq!(resolve_expiry(Some(1_743_574_344), NOW), 1_743_574_344_000);
    }

    #[test]
    fn resolve_expiry_relative_seconds() {
        assert_eq!(resolve_expiry(Some(3600), NOW), NOW + 3_600_000);
    }

    #[test]
    fn resolve_expiry_defaults_to_one_hour() {
        assert_eq!(resolve_expiry(None, NOW), NOW + DEFAULT_TOKEN_LIFETIME_MILLIS);
    }

    #[test]
    fn from_lookup_requires_access_token() {
        let lookup = |_: &str| -> Option<String> { None };
        assert!(Credential::from_lookup(&lookup, NOW).is_none());
    }

    #[test]
    fn from_lookup_reads_prior_credential() {
        let lookup = |key: &str| match key {
            "ACCESS_TOKEN" => Some("prior-token".to_string()),
            "TOKEN_TYPE" => Some("Bearer".to_string()),
            "EXPIRES_IN" => Some("1743574344".to_string()),
            _ => None,
        };
        let credential = Credential::from_lookup(&lookup, NOW).unwrap();
        assert_eq!(credential.header_value(), "Bearer prior-token");
        assert_eq!(credential.expires_at, 1_743_574_344_000);
    }

    #[test]
    fn from_lookup_unparseable_expiry_is_expired() {
        let lookup = |key: &str| match key {
            "ACCESS_TOKEN" => Some("prior-token".to_string()),
            "EXPIRES_IN" => Some("soon".to_string()),
            _ => None,
        };
        let credential = Credential::from_lookup(&lookup, NOW).unwrap();
        assert_eq!(credential.token_type, "Bearer");
        assert!(!credential.is_valid_at(NOW));
    }

    #[test]
    fn debug_does_not_leak_token() {
        let credential = Credential::new("super-secret".into(), None, NOW);
        assert!(!format!("{credential:?}").contains("super-secret"));
    }
}
