//! Owned-record queries: containers, the cards inside them, and the
//! denormalized price cache each record carries.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::connection::Connection;
use crate::error::{Result, TrackerError};
use crate::models::{
    Collection, CollectionEntry, Deck, DeckEntry, MarketPrice, OwnedRecords, PriceCache,
};
use crate::sql_builder::{SqlBuilder, SqlValue};

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CollectionEntryRow {
    id: String,
    collection_id: String,
    collection_name: String,
    card_id: String,
    quantity: i64,
    foil: bool,
    last_price: Option<f64>,
    last_price_currency: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    last_price_check: Option<DateTime<Utc>>,
}

impl From<CollectionEntryRow> for CollectionEntry {
    fn from(row: CollectionEntryRow) -> Self {
        Self {
            id: row.id,
            collection_id: row.collection_id,
            collection_name: row.collection_name,
            card_id: row.card_id,
            quantity: row.quantity,
            foil: row.foil,
            cache: PriceCache {
                last_price: row.last_price,
                last_price_currency: row.last_price_currency,
                last_price_check: row.last_price_check,
            },
        }
    }
}

#[derive(Deserialize)]
struct DeckEntryRow {
    id: String,
    deck_id: String,
    deck_name: String,
    card_id: String,
    quantity: i64,
    last_price: Option<f64>,
    last_price_currency: Option<String>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    last_price_check: Option<DateTime<Utc>>,
}

impl From<DeckEntryRow> for DeckEntry {
    fn from(row: DeckEntryRow) -> Self {
        Self {
            id: row.id,
            deck_id: row.deck_id,
            deck_name: row.deck_name,
            card_id: row.card_id,
            quantity: row.quantity,
            cache: PriceCache {
                last_price: row.last_price,
                last_price_currency: row.last_price_currency,
                last_price_check: row.last_price_check,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// FanOutReport
// ---------------------------------------------------------------------------

/// Outcome of writing a refreshed price to every owned record.
///
/// The two container kinds are updated by independent statements; a failed
/// batch leaves those rows stale until the next refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOutReport {
    pub updated: usize,
    pub failed_batches: usize,
}

impl FanOutReport {
    pub fn is_complete(&self) -> bool {
        self.failed_batches == 0
    }
}

// ---------------------------------------------------------------------------
// OwnershipQuery
// ---------------------------------------------------------------------------

/// Query interface for collections, decks and the cards they hold.
pub struct OwnershipQuery<'a> {
    conn: &'a Connection,
}

impl<'a> OwnershipQuery<'a> {
    /// Create a new `OwnershipQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    // -- Containers --------------------------------------------------------

    pub fn create_collection(&self, user_id: &str, name: &str) -> Result<Collection> {
        validate_name(user_id, name)?;
        let collection = Collection {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
        };
        self.conn.execute_statement(
            "INSERT INTO collections (id, user_id, name) VALUES (?, ?, ?)",
            &[
                SqlValue::from(&collection.id),
                SqlValue::from(&collection.user_id),
                SqlValue::from(&collection.name),
            ],
        )?;
        Ok(collection)
    }

    pub fn create_deck(&self, user_id: &str, name: &str) -> Result<Deck> {
        validate_name(user_id, name)?;
        let deck = Deck {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
        };
        self.conn.execute_statement(
            "INSERT INTO decks (id, user_id, name) VALUES (?, ?, ?)",
            &[
                SqlValue::from(&deck.id),
                SqlValue::from(&deck.user_id),
                SqlValue::from(&deck.name),
            ],
        )?;
        Ok(deck)
    }

    // -- Card records ------------------------------------------------------

    /// Record `quantity` copies of a card in a collection.
    ///
    /// The price cache starts out empty. Returns the new record id.
    pub fn add_to_collection(
        &self,
        collection_id: &str,
        card_id: &str,
        quantity: i64,
        foil: bool,
    ) -> Result<String> {
        validate_quantity(quantity)?;
        self.ensure_exists("collections", collection_id)?;

        let id = Uuid::new_v4().to_string();
        self.conn.execute_statement(
            "INSERT INTO collection_cards (id, collection_id, card_id, quantity, foil) \
             VALUES (?, ?, ?, ?, ?)",
            &[
                SqlValue::from(&id),
                SqlValue::from(collection_id),
                SqlValue::from(card_id),
                SqlValue::from(quantity),
                SqlValue::from(foil),
            ],
        )?;
        Ok(id)
    }

    /// Record `quantity` copies of a card in a deck. Returns the new record id.
    pub fn add_to_deck(&self, deck_id: &str, card_id: &str, quantity: i64) -> Result<String> {
        validate_quantity(quantity)?;
        self.ensure_exists("decks", deck_id)?;

        let id = Uuid::new_v4().to_string();
        self.conn.execute_statement(
            "INSERT INTO deck_cards (id, deck_id, card_id, quantity) VALUES (?, ?, ?, ?)",
            &[
                SqlValue::from(&id),
                SqlValue::from(deck_id),
                SqlValue::from(card_id),
                SqlValue::from(quantity),
            ],
        )?;
        Ok(id)
    }

    /// Every record `user_id` holds for `card_id`, across collections and decks.
    ///
    /// Records in containers owned by other users are never returned.
    pub fn owned_records(&self, user_id: &str, card_id: &str) -> Result<OwnedRecords> {
        let (sql, params) = SqlBuilder::new("collection_cards cc")
            .select(&[
                "cc.id",
                "cc.collection_id",
                "c.name AS collection_name",
                "cc.card_id",
                "cc.quantity",
                "cc.foil",
                "cc.last_price",
                "cc.last_price_currency",
                "cc.last_price_check",
            ])
            .join("JOIN collections c ON cc.collection_id = c.id")
            .where_eq("c.user_id", user_id)
            .where_eq("cc.card_id", card_id)
            .order_by(&["c.name ASC", "cc.id ASC"])
            .build();
        let collections: Vec<CollectionEntryRow> = self.conn.execute_into(&sql, &params)?;

        let (sql, params) = SqlBuilder::new("deck_cards dc")
            .select(&[
                "dc.id",
                "dc.deck_id",
                "d.name AS deck_name",
                "dc.card_id",
                "dc.quantity",
                "dc.last_price",
                "dc.last_price_currency",
                "dc.last_price_check",
            ])
            .join("JOIN decks d ON dc.deck_id = d.id")
            .where_eq("d.user_id", user_id)
            .where_eq("dc.card_id", card_id)
            .order_by(&["d.name ASC", "dc.id ASC"])
            .build();
        let decks: Vec<DeckEntryRow> = self.conn.execute_into(&sql, &params)?;

        Ok(OwnedRecords {
            collections: collections.into_iter().map(Into::into).collect(),
            decks: decks.into_iter().map(Into::into).collect(),
        })
    }

    /// Write the same price, currency and check time to every record
    /// `user_id` holds for `card_id`.
    ///
    /// Never fails as a whole: a batch that errors is logged and counted in
    /// the report, and the other batch still runs.
    pub fn update_cached_price(
        &self,
        user_id: &str,
        card_id: &str,
        price: MarketPrice,
        checked_at: DateTime<Utc>,
    ) -> FanOutReport {
        let batches = [
            (
                "collection_cards",
                "UPDATE collection_cards \
                 SET last_price = ?, last_price_currency = ?, last_price_check = ? \
                 WHERE card_id = ? \
                   AND collection_id IN (SELECT id FROM collections WHERE user_id = ?)",
            ),
            (
                "deck_cards",
                "UPDATE deck_cards \
                 SET last_price = ?, last_price_currency = ?, last_price_check = ? \
                 WHERE card_id = ? \
                   AND deck_id IN (SELECT id FROM decks WHERE user_id = ?)",
            ),
        ];
        let params = [
            SqlValue::from(price.amount()),
            SqlValue::from(price.currency.as_str()),
            SqlValue::from(checked_at.timestamp_millis()),
            SqlValue::from(card_id),
            SqlValue::from(user_id),
        ];

        let mut report = FanOutReport::default();
        for (table, sql) in batches {
            match self.conn.execute_statement(sql, &params) {
                Ok(n) => report.updated += n,
                Err(e) => {
                    tracing::warn!(
                        table,
                        user_id,
                        card_id,
                        error = %e,
                        "price cache update failed"
                    );
                    report.failed_batches += 1;
                }
            }
        }
        report
    }

    fn ensure_exists(&self, table: &str, id: &str) -> Result<()> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?", table);
        match self.conn.execute_scalar(&sql, &[SqlValue::from(id)])? {
            Some(_) => Ok(()),
            None => Err(TrackerError::NotFound(format!("No {} row with id '{}'", table, id))),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_name(user_id: &str, name: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(TrackerError::InvalidArgument("user id must not be empty".into()));
    }
    if name.trim().is_empty() {
        return Err(TrackerError::InvalidArgument("name must not be empty".into()));
    }
    Ok(())
}

fn validate_quantity(quantity: i64) -> Result<()> {
    if quantity < 1 {
        return Err(TrackerError::InvalidArgument(format!(
            "quantity must be at least 1, got {}",
            quantity
        )));
    }
    Ok(())
}
