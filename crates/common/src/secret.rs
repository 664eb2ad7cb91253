//! Redacting wrapper for credentials held in memory
//!
//! Bearer tokens, the access code and the client secret are kept in a
//! `Secret` so that formatting one into a log line prints a placeholder. The
//! buffer is wiped when the wrapper is dropped.

use std::fmt;
use zeroize::Zeroize;

const REDACTED: &str = "[REDACTED]";

pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the plaintext, e.g. to build an `Authorization` header or the
    /// `POST /auth` body.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<T: Zeroize> Drop for Secret<T> {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl<T: Zeroize + Clone> Clone for Secret<T> {
    fn clone(&self) -> Self {
        Self::new(self.0.clone())
    }
}

impl From<String> for Secret<String> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    #[allow(dead_code)]
    struct Login {
        client_id: String,
        client_secret: Secret<String>,
    }

    #[test]
    fn nested_secret_is_masked() {
        let login = Login {
            client_id: "client-1".into(),
            client_secret: Secret::new("s3cret".into()),
        };
        let rendered = format!("{login:?}");
        assert!(rendered.contains("client-1"));
        assert!(rendered.contains(REDACTED));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn display_is_masked() {
        let token: Secret<String> = String::from("eyJhbGciOi").into();
        assert_eq!(format!("Bearer {token}"), "Bearer [REDACTED]");
        assert_eq!(token.expose(), "eyJhbGciOi");
    }

    #[test]
    fn clone_outlives_original() {
        let code = Secret::new(String::from("access-code"));
        let copy = code.clone();
        drop(code);
        assert_eq!(copy.expose(), "access-code");
    }
}
