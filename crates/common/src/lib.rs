//! Common types for the evaluation microservices

pub mod config;
mod error;
pub mod http;
pub mod metrics;
pub mod runtime;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
