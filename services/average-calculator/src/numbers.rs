//! Number categories and the per-request window update

use serde::{Deserialize, Serialize};

use crate::window::SlidingWindow;

pub const INVALID_ID_MESSAGE: &str = "Invalid number ID. Use p, f, e, or r.";

/// Number category selected by the single-letter route id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Primes,
    Fibonacci,
    Even,
    Random,
}

impl NumberKind {
    /// Map `p`, `f`, `e`, `r` to a category.
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "p" => Some(Self::Primes),
            "f" => Some(Self::Fibonacci),
            "e" => Some(Self::Even),
            "r" => Some(Self::Random),
            _ => None,
        }
    }

    /// Upstream endpoint serving this category.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Primes => "primes",
            Self::Fibonacci => "fibo",
            Self::Even => "even",
            Self::Random => "rand",
        }
    }

    /// Static batch served by `/test-numbers/{id}`.
    pub fn mock_numbers(self) -> &'static [i64] {
        match self {
            Self::Primes => &[2, 3, 5, 7, 11, 13, 17, 19, 23, 29],
            Self::Fibonacci => &[1, 1, 2, 3, 5, 8, 13, 21, 34, 55],
            Self::Even => &[2, 4, 6, 8, 10, 12, 14, 16, 18, 20],
            Self::Random => &[7, 12, 23, 45, 67, 89, 102, 234, 567, 890],
        }
    }
}

/// Body of `GET /{primes|fibo|even|rand}`.
///
/// Numbers decode as `i64`: a single fractional or out-of-range value fails
/// the whole payload, which the fetcher then treats as an empty batch.
#[derive(Debug, Default, Deserialize)]
pub struct NumbersPayload {
    #[serde(default)]
    pub numbers: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NumbersResponse {
    pub window_prev_state: Vec<i64>,
    pub window_curr_state: Vec<i64>,
    /// The batch as received, before deduplication
    pub numbers: Vec<i64>,
    pub avg: f64,
}

/// Insert `batch` and describe the window before and after.
pub fn apply_batch(window: &mut SlidingWindow, batch: Vec<i64>) -> NumbersResponse {
    let window_prev_state = window.snapshot();
    window.insert(&batch);
    NumbersResponse {
        window_prev_state,
        window_curr_state: window.snapshot(),
        numbers: batch,
        avg: window.average(),
    }
}
