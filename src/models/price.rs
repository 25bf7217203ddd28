use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::owned::OwnedIn;
use crate::error::TrackerError;
use crate::pricing::PriceChange;

// ---------------------------------------------------------------------------
// Currency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "USD")]
    Usd,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            other => Err(TrackerError::InvalidArgument(format!(
                "Unsupported currency: '{}'",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// MarketPrice - A positive amount in whole cents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketPrice {
    pub cents: i64,
    pub currency: Currency,
}

impl MarketPrice {
    pub fn new(cents: i64, currency: Currency) -> Self {
        Self { cents, currency }
    }

    /// Build from a stored decimal amount, rounding to the nearest cent.
    pub fn from_amount(amount: f64, currency: Currency) -> Self {
        Self::new((amount * 100.0).round() as i64, currency)
    }

    pub fn amount(&self) -> f64 {
        self.cents as f64 / 100.0
    }
}

// ---------------------------------------------------------------------------
// PriceHistoryEntry - Append-only per-user, per-card observation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryEntry {
    pub id: String,
    pub user_id: String,
    pub card_id: String,
    pub price: f64,
    pub currency: Currency,
    pub checked_at: DateTime<Utc>,
}

impl PriceHistoryEntry {
    pub fn market_price(&self) -> MarketPrice {
        MarketPrice::from_amount(self.price, self.currency)
    }
}

// ---------------------------------------------------------------------------
// PriceView - The response of a price lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceView {
    pub card_id: String,
    pub price: Option<f64>,
    /// Reserved; foil prices are not tracked.
    pub price_foil: Option<f64>,
    pub currency: Currency,
    pub price_change: Option<PriceChange>,
    pub price_change_percent: Option<f64>,
    pub last_checked: DateTime<Utc>,
    pub no_price_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    pub owned_in: OwnedIn,
}
