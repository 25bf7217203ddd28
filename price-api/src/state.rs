use mtg_price_tracker::AsyncPriceTracker;

/// Shared application state available to all route handlers via Axum's
/// `State` extractor.
pub struct AppState {
    /// Dispatches blocking tracker work (DuckDB, Scryfall) to the blocking pool.
    pub tracker: AsyncPriceTracker,
}
