//! Evaluation API authentication library
//!
//! Obtains and caches the bearer credential both services attach to their
//! outbound calls. This crate has no dependency on either service binary and
//! can be tested on its own.
//!
//! Credential flow:
//! 1. Service builds an `Identity` from the environment
//! 2. Optionally seeds a prior `Credential` (`ACCESS_TOKEN` / `EXPIRES_IN`)
//! 3. `TokenManager::authorization_header()` reuses the credential until expiry
//! 4. On expiry it calls `token::request_token()` (`POST /auth`)
//! 5. If that fails, the expired credential is reused; with none held the
//!    call fails with `Error::AuthFailure`

pub mod constants;
pub mod credentials;
pub mod error;
pub mod identity;
pub mod manager;
pub mod token;

pub use constants::*;
pub use credentials::{Credential, now_millis, resolve_expiry};
pub use error::{Error, Result};
pub use identity::Identity;
pub use manager::{CredentialStatus, TokenManager};
pub use token::{TokenResponse, request_token};
