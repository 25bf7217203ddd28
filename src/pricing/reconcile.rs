//! Decides whether a cached price is stale, refetches it when needed and
//! writes the result to the history log and every owned record.
//!
//! Concurrent calls for the same (user, card) pair may both refetch and both
//! write. That is tolerated: history may gain a duplicate row and the cache
//! fields settle on whichever write lands last.

use chrono::{DateTime, Utc};

use crate::connection::Connection;
use crate::error::{Result, TrackerError};
use crate::models::{Currency, MarketPrice, OwnedRecords, PriceView};
use crate::pricing::trend::compute_trend;
use crate::queries::{OwnershipQuery, PriceHistoryQuery};
use crate::scryfall::CardProvider;

// ---------------------------------------------------------------------------
// PriceLookup
// ---------------------------------------------------------------------------

/// Result of asking the card-data provider for a current price.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceLookup {
    /// A usable EUR or USD price, possibly taken from an English printing.
    Priced(MarketPrice),
    /// The card exists but no printing carries a price.
    Unpriced,
    /// The provider does not know the card id.
    UnknownCard,
    /// Transport failure, error status or malformed body.
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// PriceReconciler
// ---------------------------------------------------------------------------

pub struct PriceReconciler<'a> {
    conn: &'a Connection,
    provider: &'a dyn CardProvider,
    staleness_window: chrono::Duration,
}

impl<'a> PriceReconciler<'a> {
    pub fn new(
        conn: &'a Connection,
        provider: &'a dyn CardProvider,
        staleness_window: chrono::Duration,
    ) -> Self {
        Self {
            conn,
            provider,
            staleness_window,
        }
    }

    /// Fetch the current price for `card_id`.
    ///
    /// When the printing itself has no EUR or USD price, falls back to an
    /// English printing with the same oracle id. A failing fallback counts as
    /// no price rather than an error.
    pub fn lookup_price(&self, card_id: &str) -> PriceLookup {
        let card = match self.provider.card_by_id(card_id) {
            Ok(Some(card)) => card,
            Ok(None) => return PriceLookup::UnknownCard,
            Err(e) => return PriceLookup::Unavailable(e.to_string()),
        };

        if let Some(price) = card.market_price() {
            return PriceLookup::Priced(price);
        }

        let Some(oracle_id) = card.oracle_id.as_deref() else {
            return PriceLookup::Unpriced;
        };

        match self.provider.english_printing(oracle_id) {
            Ok(Some(english)) => {
                tracing::debug!(
                    card_id,
                    lang = %card.lang,
                    english_id = %english.id,
                    "using English printing price"
                );
                english
                    .market_price()
                    .map(PriceLookup::Priced)
                    .unwrap_or(PriceLookup::Unpriced)
            }
            Ok(None) => PriceLookup::Unpriced,
            Err(e) => {
                tracing::warn!(card_id, oracle_id, error = %e, "English printing lookup failed");
                PriceLookup::Unpriced
            }
        }
    }

    /// [`get_price_at`](Self::get_price_at) against the wall clock.
    pub fn get_price(
        &self,
        user_id: &str,
        card_id: &str,
        force_refresh: bool,
    ) -> Result<PriceView> {
        self.get_price_at(user_id, card_id, force_refresh, Utc::now())
    }

    /// Produce a price view for a card the user owns, as of `now`.
    ///
    /// Errors with [`TrackerError::NotOwned`] when the user holds no record of
    /// the card, and [`TrackerError::NotFound`] when the provider does not
    /// know it. Provider outages degrade to cached or no-price views; failed
    /// writes are logged and do not fail the call.
    pub fn get_price_at(
        &self,
        user_id: &str,
        card_id: &str,
        force_refresh: bool,
        now: DateTime<Utc>,
    ) -> Result<PriceView> {
        let owned = OwnershipQuery::new(self.conn).owned_records(user_id, card_id)?;
        if owned.is_empty() {
            return Err(TrackerError::NotOwned {
                card_id: card_id.to_string(),
            });
        }

        let cutoff = now - self.staleness_window;

        if !force_refresh {
            let fresh = owned
                .freshest_cache(cutoff)
                .and_then(|cache| Some((cache.market_price()?, cache.last_price_check?)));
            if let Some((price, checked_at)) = fresh {
                tracing::debug!(user_id, card_id, %checked_at, "price cache hit");
                return Ok(self.priced_view(
                    user_id,
                    card_id,
                    price,
                    checked_at,
                    cutoff,
                    Some(true),
                    &owned,
                ));
            }
        }

        match self.lookup_price(card_id) {
            PriceLookup::Priced(price) => {
                tracing::info!(
                    user_id,
                    card_id,
                    price = price.amount(),
                    currency = %price.currency,
                    "price refreshed"
                );
                self.persist(user_id, card_id, price, cutoff, now, &owned);
                Ok(self.priced_view(user_id, card_id, price, now, cutoff, None, &owned))
            }
            PriceLookup::Unpriced => {
                tracing::info!(user_id, card_id, "no price available");
                Ok(no_price_view(card_id, now, &owned))
            }
            PriceLookup::UnknownCard => Err(TrackerError::NotFound(format!(
                "Card '{}' not found",
                card_id
            ))),
            PriceLookup::Unavailable(reason) => {
                tracing::warn!(
                    user_id,
                    card_id,
                    %reason,
                    "card data provider unavailable, serving cached data"
                );
                let latest = owned
                    .latest_cache()
                    .and_then(|c| c.market_price().map(|p| (p, c.last_price_check)));
                match latest {
                    Some((price, checked_at)) => Ok(self.priced_view(
                        user_id,
                        card_id,
                        price,
                        checked_at.unwrap_or(now),
                        cutoff,
                        Some(true),
                        &owned,
                    )),
                    None => Ok(no_price_view(card_id, now, &owned)),
                }
            }
        }
    }

    /// Append a history row unless the latest one is still fresh and already
    /// says the same, then fan the price out to every owned record whose
    /// cache does not already hold it with a fresh check.
    fn persist(
        &self,
        user_id: &str,
        card_id: &str,
        price: MarketPrice,
        cutoff: DateTime<Utc>,
        now: DateTime<Utc>,
        owned: &OwnedRecords,
    ) {
        let history = PriceHistoryQuery::new(self.conn);

        let duplicate = match history.latest(user_id, card_id) {
            Ok(Some(latest)) => latest.checked_at > cutoff && latest.market_price() == price,
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(
                    user_id,
                    card_id,
                    error = %e,
                    "could not read latest price history"
                );
                false
            }
        };

        if duplicate {
            tracing::debug!(user_id, card_id, "price unchanged within window, skipping history");
        } else if let Err(e) = history.record(user_id, card_id, price, now) {
            tracing::warn!(user_id, card_id, error = %e, "failed to append price history");
        }

        let in_sync = owned
            .iter()
            .map(|r| r.cache())
            .all(|c| c.is_fresh(cutoff) && c.market_price() == Some(price));
        if duplicate && in_sync {
            return;
        }

        let report =
            OwnershipQuery::new(self.conn).update_cached_price(user_id, card_id, price, now);
        if !report.is_complete() {
            tracing::warn!(
                user_id,
                card_id,
                updated = report.updated,
                failed_batches = report.failed_batches,
                "price cache partially updated"
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn priced_view(
        &self,
        user_id: &str,
        card_id: &str,
        price: MarketPrice,
        last_checked: DateTime<Utc>,
        cutoff: DateTime<Utc>,
        cached: Option<bool>,
        owned: &OwnedRecords,
    ) -> PriceView {
        // Entries written in this window never serve as their own baseline
        let history = PriceHistoryQuery::new(self.conn);
        let prior = match history.latest_before(user_id, card_id, price.currency, cutoff) {
            Ok(entry) => entry.map(|e| e.market_price()),
            Err(e) => {
                tracing::warn!(user_id, card_id, error = %e, "could not read price baseline");
                None
            }
        };
        let trend = compute_trend(price, prior);

        PriceView {
            card_id: card_id.to_string(),
            price: Some(price.amount()),
            price_foil: None,
            currency: price.currency,
            price_change: trend.map(|t| t.change),
            price_change_percent: trend.map(|t| t.percent),
            last_checked,
            no_price_available: false,
            cached,
            owned_in: owned.owned_in(),
        }
    }
}

fn no_price_view(card_id: &str, now: DateTime<Utc>, owned: &OwnedRecords) -> PriceView {
    PriceView {
        card_id: card_id.to_string(),
        price: None,
        price_foil: None,
        currency: Currency::default(),
        price_change: None,
        price_change_percent: None,
        last_checked: now,
        no_price_available: true,
        cached: None,
        owned_in: owned.owned_in(),
    }
}
