use std::time::Duration;

pub const SCRYFALL_API_BASE: &str = "https://api.scryfall.com";

/// Scryfall asks clients to identify themselves and to accept JSON.
pub const USER_AGENT: &str = concat!("mtg-price-tracker/", env!("CARGO_PKG_VERSION"));

/// Cached prices older than this are refetched.
pub const STALENESS_WINDOW_HOURS: i64 = 24;

/// Moves within +/- this percentage are reported as `stable`.
pub const TREND_DEAD_BAND_PERCENT: i64 = 2;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Scryfall requests 50-100 ms between calls.
pub const DEFAULT_REQUEST_INTERVAL: Duration = Duration::from_millis(100);

pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Backoff used for a 429 response that carries no `Retry-After` header.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(1);

/// Longest 429 backoff a client will sleep through; it is further capped at
/// the client's request timeout.
pub const MAX_RETRY_BACKOFF: Duration = Duration::from_secs(10);

pub const DEFAULT_HISTORY_LIMIT: usize = 100;

pub fn staleness_window() -> chrono::Duration {
    chrono::Duration::hours(STALENESS_WINDOW_HOURS)
}

/// DDL applied on every open. Timestamps are epoch milliseconds.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS collections (
    id VARCHAR PRIMARY KEY,
    user_id VARCHAR NOT NULL,
    name VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS decks (
    id VARCHAR PRIMARY KEY,
    user_id VARCHAR NOT NULL,
    name VARCHAR NOT NULL
);
CREATE TABLE IF NOT EXISTS collection_cards (
    id VARCHAR PRIMARY KEY,
    collection_id VARCHAR NOT NULL,
    card_id VARCHAR NOT NULL,
    quantity BIGINT NOT NULL,
    foil BOOLEAN NOT NULL DEFAULT FALSE,
    last_price DOUBLE,
    last_price_currency VARCHAR,
    last_price_check BIGINT
);
CREATE TABLE IF NOT EXISTS deck_cards (
    id VARCHAR PRIMARY KEY,
    deck_id VARCHAR NOT NULL,
    card_id VARCHAR NOT NULL,
    quantity BIGINT NOT NULL,
    last_price DOUBLE,
    last_price_currency VARCHAR,
    last_price_check BIGINT
);
CREATE TABLE IF NOT EXISTS price_history (
    id VARCHAR PRIMARY KEY,
    user_id VARCHAR NOT NULL,
    card_id VARCHAR NOT NULL,
    price DOUBLE NOT NULL,
    currency VARCHAR NOT NULL,
    checked_at BIGINT NOT NULL
);
"#;
