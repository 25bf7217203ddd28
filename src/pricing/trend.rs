//! Trend classification against the last price from a previous window.

use serde::{Deserialize, Serialize};

use crate::config::TREND_DEAD_BAND_PERCENT;
use crate::models::MarketPrice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceChange {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trend {
    pub change: PriceChange,
    /// Percentage move relative to the prior price, rounded to one decimal.
    pub percent: f64,
}

/// Compare `current` against `prior`.
///
/// Returns `None` without a usable baseline: the prior is absent, non-positive,
/// or quoted in a different currency.
///
/// Classification uses whole cents so a move of exactly the dead-band width
/// is always `stable`; the reported percent is rounded for display only.
pub fn compute_trend(current: MarketPrice, prior: Option<MarketPrice>) -> Option<Trend> {
    let prior = prior?;
    if prior.cents <= 0 || prior.currency != current.currency {
        return None;
    }

    let delta = current.cents - prior.cents;
    let band = TREND_DEAD_BAND_PERCENT * prior.cents;
    let change = if delta * 100 > band {
        PriceChange::Up
    } else if delta * 100 < -band {
        PriceChange::Down
    } else {
        PriceChange::Stable
    };

    let percent = delta as f64 / prior.cents as f64 * 100.0;
    Some(Trend {
        change,
        percent: (percent * 10.0).round() / 10.0,
    })
}
