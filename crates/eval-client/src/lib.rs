//! Resilient client for evaluation API data endpoints
//!
//! Wraps each remote call with the cached bearer credential from `eval-auth`
//! and a hard timeout. Failures come back as `FetchError`; callers choose the
//! fallback payload (empty list, mock table) through `Fetcher::fetch_or`.

pub mod error;
pub mod fetch;

pub use error::FetchError;
pub use fetch::{Fetcher, record_fallback};
