//! Service-owned state shared by all handlers

use std::time::UNIX_EPOCH;

use eval_client::Fetcher;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::numbers::{NumberKind, NumbersPayload, NumbersResponse, apply_batch};
use crate::window::SlidingWindow;

/// Window plus the client that feeds it.
///
/// The window lock is held from the first snapshot through the fetch to the
/// second snapshot, so concurrent requests are applied one at a time.
pub struct ServiceState {
    window: Mutex<SlidingWindow>,
    fetcher: Fetcher,
}

/// Window summary reported on `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStatus {
    pub size: usize,
    pub capacity: usize,
    /// Last mutation as unix timestamp in milliseconds
    pub last_updated: u64,
}

impl ServiceState {
    pub fn new(window_size: usize, fetcher: Fetcher) -> Self {
        Self {
            window: Mutex::new(SlidingWindow::new(window_size)),
            fetcher,
        }
    }

    /// Fetch a batch from the evaluation API and apply it.
    ///
    /// Any upstream failure becomes an empty batch.
    pub async fn update_from_upstream(&self, kind: NumberKind) -> NumbersResponse {
        let mut window = self.window.lock().await;
        let payload: NumbersPayload = self
            .fetcher
            .fetch_or(kind.endpoint(), &[], NumbersPayload::default)
            .await;
        if payload.numbers.is_empty() {
            info!(endpoint = kind.endpoint(), "no numbers received");
        } else {
            debug!(endpoint = kind.endpoint(), numbers = ?payload.numbers, "received numbers");
        }
        apply_batch(&mut window, payload.numbers)
    }

    /// Apply the static batch for `kind` without calling upstream.
    pub async fn update_from_mock(&self, kind: NumberKind) -> NumbersResponse {
        let mut window = self.window.lock().await;
        apply_batch(&mut window, kind.mock_numbers().to_vec())
    }

    pub async fn window_status(&self) -> WindowStatus {
        let window = self.window.lock().await;
        let last_updated = window
            .last_updated()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        WindowStatus {
            size: window.len(),
            capacity: window.capacity(),
            last_updated,
        }
    }
}
