//! Price tracking for owned Magic: The Gathering cards.
//!
//! Users record cards in collections and decks; each record carries a cached
//! market price. [`PriceTracker::get_price`] serves that cache while it is
//! fresh, refetches from Scryfall once it goes stale, classifies the move
//! against the previous window and writes the new price to every record the
//! user holds for the card plus an append-only history log.
//!
//! # Quick start
//!
//! ```no_run
//! use mtg_price_tracker::PriceTracker;
//!
//! let tracker = PriceTracker::builder()
//!     .database("prices.duckdb")
//!     .build()
//!     .unwrap();
//!
//! let modern = tracker.ownership().create_collection("user-1", "Modern").unwrap();
//! tracker
//!     .ownership()
//!     .add_to_collection(&modern.id, "e3285e6b-3e79-4d7c-bf96-d920f973b80d", 2, false)
//!     .unwrap();
//!
//! let view = tracker
//!     .get_price("user-1", "e3285e6b-3e79-4d7c-bf96-d920f973b80d", false)
//!     .unwrap();
//! println!("{:?} {}", view.price, view.currency);
//! ```

#[cfg(feature = "async")]
pub mod async_tracker;
pub mod config;
pub mod connection;
pub mod error;
pub mod models;
pub mod pricing;
pub mod queries;
pub mod scryfall;
pub mod sql_builder;

#[cfg(feature = "async")]
pub use async_tracker::AsyncPriceTracker;
pub use connection::Connection;
pub use error::{Result, TrackerError};
pub use models::{PriceHistoryEntry, PriceView};
pub use pricing::{PriceChange, PriceLookup};
pub use scryfall::{CardProvider, RequestGate, ScryfallClient};
pub use sql_builder::{SqlBuilder, SqlValue};

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// PriceTrackerBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`PriceTracker`].
///
/// Use [`PriceTracker::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](PriceTrackerBuilder::build).
pub struct PriceTrackerBuilder {
    database: Option<PathBuf>,
    api_base: String,
    timeout: Duration,
    request_interval: Duration,
    max_retries: u32,
    staleness_window: chrono::Duration,
    provider: Option<Box<dyn CardProvider>>,
}

impl Default for PriceTrackerBuilder {
    fn default() -> Self {
        Self {
            database: None,
            api_base: config::SCRYFALL_API_BASE.to_string(),
            timeout: config::DEFAULT_TIMEOUT,
            request_interval: config::DEFAULT_REQUEST_INTERVAL,
            max_retries: config::DEFAULT_MAX_RETRIES,
            staleness_window: config::staleness_window(),
            provider: None,
        }
    }
}

impl PriceTrackerBuilder {
    /// Store data in a DuckDB file instead of in memory.
    pub fn database<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.database = Some(path.as_ref().to_path_buf());
        self
    }

    /// Scryfall API base URL. Defaults to `https://api.scryfall.com`.
    pub fn api_base(mut self, url: &str) -> Self {
        self.api_base = url.to_string();
        self
    }

    /// HTTP timeout for Scryfall requests. Defaults to 30 seconds.
    ///
    /// A timed-out request is handled like any other provider failure.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Minimum spacing between Scryfall requests. Defaults to 100 ms.
    pub fn request_interval(mut self, interval: Duration) -> Self {
        self.request_interval = interval;
        self
    }

    /// Retries after `429 Too Many Requests`. Defaults to 2.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Age after which a cached price is refetched. Defaults to 24 hours.
    pub fn staleness_window(mut self, window: chrono::Duration) -> Self {
        self.staleness_window = window;
        self
    }

    /// Use a custom card-data provider instead of the Scryfall client.
    pub fn provider<P: CardProvider + 'static>(mut self, provider: P) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Open the database, apply the schema and set up the provider.
    pub fn build(self) -> Result<PriceTracker> {
        if self.staleness_window <= chrono::Duration::zero() {
            return Err(TrackerError::InvalidArgument(
                "staleness window must be positive".into(),
            ));
        }

        let conn = match &self.database {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };

        let provider = match self.provider {
            Some(provider) => provider,
            None => Box::new(ScryfallClient::new(
                &self.api_base,
                self.timeout,
                RequestGate::new(self.request_interval),
                self.max_retries,
            )?),
        };

        Ok(PriceTracker {
            conn,
            provider,
            staleness_window: self.staleness_window,
            database: self.database,
        })
    }
}

// ---------------------------------------------------------------------------
// PriceTracker
// ---------------------------------------------------------------------------

/// The main entry point: owns the database connection and the card-data
/// provider, and exposes query interfaces as lightweight borrowing wrappers.
pub struct PriceTracker {
    conn: Connection,
    provider: Box<dyn CardProvider>,
    staleness_window: chrono::Duration,
    database: Option<PathBuf>,
}

impl PriceTracker {
    /// Create a new builder for configuring the tracker.
    pub fn builder() -> PriceTrackerBuilder {
        PriceTrackerBuilder::default()
    }

    // -- Query accessors ---------------------------------------------------

    /// Collections, decks and the card records inside them.
    pub fn ownership(&self) -> queries::OwnershipQuery<'_> {
        queries::OwnershipQuery::new(&self.conn)
    }

    /// The append-only price history log.
    pub fn history(&self) -> queries::PriceHistoryQuery<'_> {
        queries::PriceHistoryQuery::new(&self.conn)
    }

    /// The reconciliation service bound to this tracker's store and provider.
    pub fn reconciler(&self) -> pricing::PriceReconciler<'_> {
        pricing::PriceReconciler::new(&self.conn, &*self.provider, self.staleness_window)
    }

    // -- Price operations --------------------------------------------------

    /// Current price view for a card the user owns.
    ///
    /// Serves the cached price while it is younger than the staleness window
    /// unless `force_refresh` is set.
    pub fn get_price(
        &self,
        user_id: &str,
        card_id: &str,
        force_refresh: bool,
    ) -> Result<PriceView> {
        self.reconciler().get_price(user_id, card_id, force_refresh)
    }

    /// [`get_price`](Self::get_price) evaluated at an explicit instant.
    pub fn get_price_at(
        &self,
        user_id: &str,
        card_id: &str,
        force_refresh: bool,
        now: DateTime<Utc>,
    ) -> Result<PriceView> {
        self.reconciler().get_price_at(user_id, card_id, force_refresh, now)
    }

    /// Recorded prices for a card, oldest first, at most `limit` entries.
    pub fn price_history(
        &self,
        user_id: &str,
        card_id: &str,
        limit: usize,
    ) -> Result<Vec<PriceHistoryEntry>> {
        if limit == 0 {
            return Err(TrackerError::InvalidArgument("limit must be at least 1".into()));
        }
        self.history().list(user_id, card_id, limit)
    }

    pub fn staleness_window(&self) -> chrono::Duration {
        self.staleness_window
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for PriceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let database = self
            .database
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        write!(
            f,
            "PriceTracker(database={}, staleness_window={}h)",
            database,
            self.staleness_window.num_hours()
        )
    }
}
