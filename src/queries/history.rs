//! Append-only price history, one row per refresh of a (user, card) pair.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::connection::Connection;
use crate::error::Result;
use crate::models::{Currency, MarketPrice, PriceHistoryEntry};
use crate::sql_builder::{SqlBuilder, SqlValue};

#[derive(Deserialize)]
struct HistoryRow {
    id: String,
    user_id: String,
    card_id: String,
    price: f64,
    currency: Currency,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    checked_at: DateTime<Utc>,
}

impl From<HistoryRow> for PriceHistoryEntry {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            card_id: row.card_id,
            price: row.price,
            currency: row.currency,
            checked_at: row.checked_at,
        }
    }
}

// ---------------------------------------------------------------------------
// PriceHistoryQuery
// ---------------------------------------------------------------------------

/// Query interface for the `price_history` table.
///
/// Rows are only ever inserted; nothing here updates or deletes them.
pub struct PriceHistoryQuery<'a> {
    conn: &'a Connection,
}

impl<'a> PriceHistoryQuery<'a> {
    /// Create a new `PriceHistoryQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Append an observation.
    pub fn record(
        &self,
        user_id: &str,
        card_id: &str,
        price: MarketPrice,
        checked_at: DateTime<Utc>,
    ) -> Result<PriceHistoryEntry> {
        let entry = PriceHistoryEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            card_id: card_id.to_string(),
            price: price.amount(),
            currency: price.currency,
            checked_at,
        };
        self.conn.execute_statement(
            "INSERT INTO price_history (id, user_id, card_id, price, currency, checked_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
            &[
                SqlValue::from(&entry.id),
                SqlValue::from(&entry.user_id),
                SqlValue::from(&entry.card_id),
                SqlValue::from(entry.price),
                SqlValue::from(entry.currency.as_str()),
                SqlValue::from(checked_at.timestamp_millis()),
            ],
        )?;
        Ok(entry)
    }

    /// The most recent entry for the pair, of any age.
    pub fn latest(&self, user_id: &str, card_id: &str) -> Result<Option<PriceHistoryEntry>> {
        let (sql, params) = SqlBuilder::new("price_history")
            .where_eq("user_id", user_id)
            .where_eq("card_id", card_id)
            .order_by(&["checked_at DESC"])
            .limit(1)
            .build();
        self.first(&sql, &params)
    }

    /// The most recent positive-priced entry in `currency` checked strictly
    /// before `cutoff`.
    pub fn latest_before(
        &self,
        user_id: &str,
        card_id: &str,
        currency: Currency,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<PriceHistoryEntry>> {
        let (sql, params) = SqlBuilder::new("price_history")
            .where_eq("user_id", user_id)
            .where_eq("card_id", card_id)
            .where_eq("currency", currency.as_str())
            .where_lt("checked_at", cutoff.timestamp_millis())
            .where_gt("price", 0.0)
            .order_by(&["checked_at DESC"])
            .limit(1)
            .build();
        self.first(&sql, &params)
    }

    /// Up to `limit` most recent entries, oldest first.
    pub fn list(
        &self,
        user_id: &str,
        card_id: &str,
        limit: usize,
    ) -> Result<Vec<PriceHistoryEntry>> {
        let (sql, params) = SqlBuilder::new("price_history")
            .where_eq("user_id", user_id)
            .where_eq("card_id", card_id)
            .order_by(&["checked_at DESC"])
            .limit(limit)
            .build();
        let rows: Vec<HistoryRow> = self.conn.execute_into(&sql, &params)?;
        let mut entries: Vec<PriceHistoryEntry> = rows.into_iter().map(Into::into).collect();
        entries.reverse();
        Ok(entries)
    }

    /// Number of entries recorded for the pair.
    pub fn count(&self, user_id: &str, card_id: &str) -> Result<i64> {
        let (sql, params) = SqlBuilder::new("price_history")
            .select(&["COUNT(*)"])
            .where_eq("user_id", user_id)
            .where_eq("card_id", card_id)
            .build();
        Ok(self
            .conn
            .execute_scalar(&sql, &params)?
            .and_then(|v| v.as_i64())
            .unwrap_or(0))
    }

    fn first(&self, sql: &str, params: &[SqlValue]) -> Result<Option<PriceHistoryEntry>> {
        let rows: Vec<HistoryRow> = self.conn.execute_into(sql, params)?;
        Ok(rows.into_iter().next().map(Into::into))
    }
}
