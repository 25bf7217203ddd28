use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::price::{Currency, MarketPrice};

// ---------------------------------------------------------------------------
// PriceCache - Denormalized price fields carried by every owned record
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceCache {
    pub last_price: Option<f64>,
    pub last_price_currency: Option<String>,
    pub last_price_check: Option<DateTime<Utc>>,
}

impl PriceCache {
    /// The cached price, if one was ever recorded.
    pub fn market_price(&self) -> Option<MarketPrice> {
        let amount = self.last_price?;
        let currency = self
            .last_price_currency
            .as_deref()
            .and_then(|c| c.parse().ok())
            .unwrap_or(Currency::Eur);
        Some(MarketPrice::from_amount(amount, currency))
    }

    /// Checked strictly after `cutoff` and holding a price.
    pub fn is_fresh(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_price.is_some() && self.last_price_check.is_some_and(|checked| checked > cutoff)
    }
}

// ---------------------------------------------------------------------------
// CollectionEntry / DeckEntry - A user's copies of a card in one container
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub id: String,
    pub collection_id: String,
    pub collection_name: String,
    pub card_id: String,
    pub quantity: i64,
    pub foil: bool,
    #[serde(flatten)]
    pub cache: PriceCache,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub id: String,
    pub deck_id: String,
    pub deck_name: String,
    pub card_id: String,
    pub quantity: i64,
    #[serde(flatten)]
    pub cache: PriceCache,
}

/// Either kind of owned record, borrowed from an [`OwnedRecords`] set.
#[derive(Debug, Clone, Copy)]
pub enum OwnedCardRecord<'a> {
    Collection(&'a CollectionEntry),
    Deck(&'a DeckEntry),
}

impl<'a> OwnedCardRecord<'a> {
    pub fn cache(&self) -> &'a PriceCache {
        match self {
            OwnedCardRecord::Collection(e) => &e.cache,
            OwnedCardRecord::Deck(e) => &e.cache,
        }
    }
}

// ---------------------------------------------------------------------------
// OwnedRecords - Every record a user holds for one card
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OwnedRecords {
    pub collections: Vec<CollectionEntry>,
    pub decks: Vec<DeckEntry>,
}

impl OwnedRecords {
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty() && self.decks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.collections.len() + self.decks.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = OwnedCardRecord<'_>> {
        self.collections
            .iter()
            .map(OwnedCardRecord::Collection)
            .chain(self.decks.iter().map(OwnedCardRecord::Deck))
    }

    /// The most recently checked cache that is still inside the window.
    pub fn freshest_cache(&self, cutoff: DateTime<Utc>) -> Option<&PriceCache> {
        self.iter()
            .map(|r| r.cache())
            .filter(|c| c.is_fresh(cutoff))
            .max_by_key(|c| c.last_price_check)
    }

    /// The most recently checked cache holding any price, regardless of age.
    pub fn latest_cache(&self) -> Option<&PriceCache> {
        self.iter()
            .map(|r| r.cache())
            .filter(|c| c.last_price.is_some())
            .max_by_key(|c| c.last_price_check)
    }

    pub fn owned_in(&self) -> OwnedIn {
        OwnedIn {
            collections: self
                .collections
                .iter()
                .map(|e| CollectionHolding {
                    id: e.collection_id.clone(),
                    name: e.collection_name.clone(),
                    quantity: e.quantity,
                    foil: e.foil,
                })
                .collect(),
            decks: self
                .decks
                .iter()
                .map(|e| DeckHolding {
                    id: e.deck_id.clone(),
                    name: e.deck_name.clone(),
                    quantity: e.quantity,
                })
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// OwnedIn - Ownership listing attached to a price view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnedIn {
    pub collections: Vec<CollectionHolding>,
    pub decks: Vec<DeckHolding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionHolding {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub foil: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckHolding {
    pub id: String,
    pub name: String,
    pub quantity: i64,
}
