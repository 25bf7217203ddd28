//! Shared test fixtures for the price tracker integration tests.
//!
//! Provides a scripted [`FakeProvider`] standing in for Scryfall, card
//! builders, and `setup_tracker()` which wires both to an in-memory DuckDB.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use mtg_price_tracker::models::{CardPrices, ScryfallCard};
use mtg_price_tracker::{CardProvider, PriceTracker, Result, TrackerError};

pub const USER: &str = "user-1";
pub const OTHER_USER: &str = "user-2";

/// Fixed reference instant so staleness windows are deterministic.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn hours_after_t0(hours: i64) -> DateTime<Utc> {
    t0() + chrono::Duration::hours(hours)
}

// ---------------------------------------------------------------------------
// Card builders
// ---------------------------------------------------------------------------

pub fn card(
    id: &str,
    lang: &str,
    oracle_id: Option<&str>,
    eur: Option<&str>,
    usd: Option<&str>,
) -> ScryfallCard {
    ScryfallCard {
        id: id.to_string(),
        oracle_id: oracle_id.map(str::to_string),
        name: format!("Card {}", id),
        lang: lang.to_string(),
        set: Some("mh2".to_string()),
        collector_number: Some("1".to_string()),
        prices: CardPrices {
            eur: eur.map(str::to_string),
            usd: usd.map(str::to_string),
            ..CardPrices::default()
        },
    }
}

pub fn eur_card(id: &str, eur: &str) -> ScryfallCard {
    card(id, "en", Some(&format!("oracle-{}", id)), Some(eur), None)
}

// ---------------------------------------------------------------------------
// FakeProvider
// ---------------------------------------------------------------------------

/// Scripted card-data provider that counts every call.
#[derive(Default)]
pub struct FakeProvider {
    cards: Mutex<HashMap<String, ScryfallCard>>,
    english: Mutex<HashMap<String, ScryfallCard>>,
    offline: AtomicBool,
    card_calls: AtomicUsize,
    search_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_card(&self, card: ScryfallCard) {
        self.cards.lock().unwrap().insert(card.id.clone(), card);
    }

    pub fn set_english_printing(&self, oracle_id: &str, card: ScryfallCard) {
        self.english
            .lock()
            .unwrap()
            .insert(oracle_id.to_string(), card);
    }

    /// Make every call fail like a network outage.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn card_calls(&self) -> usize {
        self.card_calls.load(Ordering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }
}

impl CardProvider for FakeProvider {
    fn card_by_id(&self, card_id: &str) -> Result<Option<ScryfallCard>> {
        self.card_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(TrackerError::Upstream("connection refused".into()));
        }
        Ok(self.cards.lock().unwrap().get(card_id).cloned())
    }

    fn english_printing(&self, oracle_id: &str) -> Result<Option<ScryfallCard>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(TrackerError::Upstream("connection refused".into()));
        }
        Ok(self.english.lock().unwrap().get(oracle_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Tracker setup
// ---------------------------------------------------------------------------

/// In-memory tracker backed by the given fake provider.
pub fn setup_tracker(provider: &Arc<FakeProvider>) -> PriceTracker {
    PriceTracker::builder()
        .provider(Arc::clone(provider))
        .build()
        .unwrap()
}

/// Put `quantity` copies of `card_id` into a new collection named `name`.
/// Returns the collection id.
pub fn own_in_collection(
    tracker: &PriceTracker,
    user_id: &str,
    name: &str,
    card_id: &str,
    quantity: i64,
) -> String {
    let collection = tracker.ownership().create_collection(user_id, name).unwrap();
    tracker
        .ownership()
        .add_to_collection(&collection.id, card_id, quantity, false)
        .unwrap();
    collection.id
}

/// Put `quantity` copies of `card_id` into a new deck named `name`.
/// Returns the deck id.
pub fn own_in_deck(
    tracker: &PriceTracker,
    user_id: &str,
    name: &str,
    card_id: &str,
    quantity: i64,
) -> String {
    let deck = tracker.ownership().create_deck(user_id, name).unwrap();
    tracker
        .ownership()
        .add_to_deck(&deck.id, card_id, quantity)
        .unwrap();
    deck.id
}
