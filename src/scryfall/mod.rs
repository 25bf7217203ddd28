//! Card-data provider backed by the Scryfall REST API.
//!
//! The price tracker talks to the provider through the [`CardProvider`] trait
//! so tests can substitute a scripted implementation.

pub mod throttle;

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};

use crate::config;
use crate::error::{Result, TrackerError};
use crate::models::{ScryfallCard, ScryfallList};
pub use throttle::RequestGate;

// ---------------------------------------------------------------------------
// CardProvider
// ---------------------------------------------------------------------------

/// Source of card reference data and current market prices.
pub trait CardProvider: Send + Sync {
    /// Look up a printing by its provider id. `Ok(None)` means the id is unknown.
    fn card_by_id(&self, card_id: &str) -> Result<Option<ScryfallCard>>;

    /// Find an English printing sharing `oracle_id`, preferring one that carries a price.
    fn english_printing(&self, oracle_id: &str) -> Result<Option<ScryfallCard>>;
}

impl<T: CardProvider + ?Sized> CardProvider for Arc<T> {
    fn card_by_id(&self, card_id: &str) -> Result<Option<ScryfallCard>> {
        (**self).card_by_id(card_id)
    }

    fn english_printing(&self, oracle_id: &str) -> Result<Option<ScryfallCard>> {
        (**self).english_printing(oracle_id)
    }
}

impl<T: CardProvider + ?Sized> CardProvider for Box<T> {
    fn card_by_id(&self, card_id: &str) -> Result<Option<ScryfallCard>> {
        (**self).card_by_id(card_id)
    }

    fn english_printing(&self, oracle_id: &str) -> Result<Option<ScryfallCard>> {
        (**self).english_printing(oracle_id)
    }
}

// ---------------------------------------------------------------------------
// ScryfallClient
// ---------------------------------------------------------------------------

/// Blocking Scryfall client with a per-instance request gate and bounded
/// retries on `429 Too Many Requests`.
pub struct ScryfallClient {
    client: Client,
    base: Url,
    gate: RequestGate,
    max_retries: u32,
    retry_backoff: Duration,
    max_backoff: Duration,
}

impl ScryfallClient {
    /// Create a client against `base` (e.g. [`config::SCRYFALL_API_BASE`]).
    pub fn new(base: &str, timeout: Duration, gate: RequestGate, max_retries: u32) -> Result<Self> {
        let base = Url::parse(base).map_err(|e| {
            TrackerError::InvalidArgument(format!("Invalid Scryfall base URL '{}': {}", base, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(TrackerError::InvalidArgument(format!(
                "Scryfall base URL '{}' cannot carry a path",
                base
            )));
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config::USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;
        Ok(Self {
            client,
            base,
            gate,
            max_retries,
            retry_backoff: config::DEFAULT_RETRY_BACKOFF,
            max_backoff: timeout.min(config::MAX_RETRY_BACKOFF),
        })
    }

    /// Override the wait used for a 429 response without `Retry-After`.
    ///
    /// Capped like any other backoff at the smaller of the request timeout
    /// and [`config::MAX_RETRY_BACKOFF`].
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET through the gate. `Ok(None)` on 404; other error statuses are errors.
    fn get(&self, url: Url, query: &[(&str, &str)]) -> Result<Option<Response>> {
        let mut attempt = 0;
        loop {
            self.gate.wait();
            let resp = self
                .client
                .get(url.clone())
                .header(reqwest::header::ACCEPT, "application/json")
                .query(query)
                .send()?;

            match resp.status() {
                StatusCode::NOT_FOUND => return Ok(None),
                StatusCode::TOO_MANY_REQUESTS if attempt < self.max_retries => {
                    let delay = retry_after(&resp).unwrap_or(self.retry_backoff);
                    if delay > self.max_backoff {
                        return Err(TrackerError::Upstream(format!(
                            "Scryfall asked to retry after {:?}, longer than {:?}",
                            delay, self.max_backoff
                        )));
                    }
                    attempt += 1;
                    tracing::warn!(
                        url = %url,
                        attempt,
                        ?delay,
                        "Scryfall rate limited, backing off"
                    );
                    thread::sleep(delay);
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    return Err(TrackerError::Upstream(format!(
                        "rate limited by Scryfall after {} retries",
                        attempt
                    )));
                }
                _ => return Ok(Some(resp.error_for_status()?)),
            }
        }
    }
}

impl CardProvider for ScryfallClient {
    fn card_by_id(&self, card_id: &str) -> Result<Option<ScryfallCard>> {
        let url = self.endpoint(&["cards", card_id]);
        match self.get(url, &[])? {
            Some(resp) => Ok(Some(resp.json()?)),
            None => Ok(None),
        }
    }

    fn english_printing(&self, oracle_id: &str) -> Result<Option<ScryfallCard>> {
        let url = self.endpoint(&["cards", "search"]);
        let q = format!("oracleid:{} lang:en", oracle_id);
        let Some(resp) = self.get(url, &[("q", q.as_str()), ("unique", "prints")])? else {
            return Ok(None);
        };
        let list: ScryfallList = resp.json()?;
        Ok(pick_english_printing(list.data))
    }
}

/// First English printing with a price, else the first English printing.
pub fn pick_english_printing(cards: Vec<ScryfallCard>) -> Option<ScryfallCard> {
    let mut english = cards.into_iter().filter(|c| c.is_english());
    let first = english.next()?;
    if first.market_price().is_some() {
        return Some(first);
    }
    Some(english.find(|c| c.market_price().is_some()).unwrap_or(first))
}

fn retry_after(resp: &Response) -> Option<Duration> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
