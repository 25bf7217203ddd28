//! Async wrapper around [`PriceTracker`] for use in async runtimes (Tokio, etc.).
//!
//! Runs every tracker operation on the blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free while
//! DuckDB and the blocking Scryfall client do their I/O.
//!
//! # Example
//!
//! ```no_run
//! use mtg_price_tracker::{AsyncPriceTracker, PriceTracker};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tracker = AsyncPriceTracker::build(PriceTracker::builder()).await.unwrap();
//!     let view = tracker.get_price("user-1", "some-card-id", false).await;
//! }
//! ```

use std::sync::{Arc, Mutex};

use crate::error::{Result, TrackerError};
use crate::models::{PriceHistoryEntry, PriceView};
use crate::{PriceTracker, PriceTrackerBuilder};

/// Async wrapper around [`PriceTracker`].
///
/// The tracker sits behind a [`Mutex`] because the DuckDB connection is not
/// `Sync`. Calls are therefore serialized; each one is a short burst of
/// queries plus at most two provider requests.
#[derive(Clone)]
pub struct AsyncPriceTracker {
    inner: Arc<Mutex<PriceTracker>>,
}

impl AsyncPriceTracker {
    /// Build a tracker on the blocking pool so opening the database does not
    /// stall the event loop.
    pub async fn build(builder: PriceTrackerBuilder) -> Result<Self> {
        tokio::task::spawn_blocking(move || builder.build().map(Self::new))
            .await
            .map_err(|e| TrackerError::Runtime(format!("Task join error: {e}")))?
    }

    /// Wrap an already-built tracker.
    pub fn new(tracker: PriceTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    /// Run a sync tracker operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&PriceTracker) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let tracker = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = tracker
                .lock()
                .map_err(|_| TrackerError::Runtime("tracker lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| TrackerError::Runtime(format!("Task join error: {e}")))?
    }

    /// Async [`PriceTracker::get_price`].
    pub async fn get_price(
        &self,
        user_id: &str,
        card_id: &str,
        force_refresh: bool,
    ) -> Result<PriceView> {
        let user_id = user_id.to_string();
        let card_id = card_id.to_string();
        self.run(move |t| t.get_price(&user_id, &card_id, force_refresh))
            .await
    }

    /// Async [`PriceTracker::price_history`].
    pub async fn price_history(
        &self,
        user_id: &str,
        card_id: &str,
        limit: usize,
    ) -> Result<Vec<PriceHistoryEntry>> {
        let user_id = user_id.to_string();
        let card_id = card_id.to_string();
        self.run(move |t| t.price_history(&user_id, &card_id, limit))
            .await
    }
}
