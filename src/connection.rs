//! DuckDB store holding owned records and price history.
//!
//! Query results are returned as JSON row maps; query modules deserialize
//! them into private row structs.

use crate::config;
use crate::error::{Result, TrackerError};
use crate::sql_builder::SqlValue;
use duckdb::{types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::Path;

/// One result row keyed by column name.
pub type Row = HashMap<String, serde_json::Value>;

/// Wraps a DuckDB connection holding the ownership and price history tables.
pub struct Connection {
    conn: DuckDbConnection,
}

impl Connection {
    /// Open an in-memory database and create the schema.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(DuckDbConnection::open_in_memory()?)
    }

    /// Open (or create) a database file and create any missing tables.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::init(DuckDbConnection::open(path)?)
    }

    fn init(conn: DuckDbConnection) -> Result<Self> {
        conn.execute_batch(config::SCHEMA)?;
        Ok(Self { conn })
    }

    /// Run a query and collect every row as a column-name → JSON map.
    pub fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind(params).as_slice())?;

        // Column metadata is only available once the query has run
        let columns: Vec<String> = match rows.as_ref() {
            Some(s) => s.column_names().into_iter().map(|c| c.to_string()).collect(),
            None => return Err(TrackerError::InvalidArgument("statement has no result set".into())),
        };

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut map = Row::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                map.insert(name.clone(), to_json(row.get_ref(i)?));
            }
            out.push(map);
        }
        Ok(out)
    }

    /// Run a query and deserialize each row into `T`.
    pub fn execute_into<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Vec<T>> {
        self.execute(sql, params)?
            .into_iter()
            .map(|row| -> Result<T> {
                let object = serde_json::Value::Object(row.into_iter().collect());
                Ok(serde_json::from_value(object)?)
            })
            .collect()
    }

    /// First column of the first row, or `None` for an empty result.
    pub fn execute_scalar(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind(params).as_slice())?;
        match rows.next()? {
            Some(row) => Ok(Some(to_json(row.get_ref(0)?))),
            None => Ok(None),
        }
    }

    /// Run an INSERT, UPDATE or DDL statement; returns the affected row count.
    pub fn execute_statement(&self, sql: &str, params: &[SqlValue]) -> Result<usize> {
        Ok(self.conn.execute(sql, bind(params).as_slice())?)
    }

    /// The underlying DuckDB handle.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

fn bind(params: &[SqlValue]) -> Vec<&dyn duckdb::ToSql> {
    params.iter().map(|p| p as &dyn duckdb::ToSql).collect()
}

/// Map the column types this schema produces onto JSON.
///
/// Timestamps are BIGINT epoch milliseconds, so temporal DuckDB types never
/// reach this function and fall through to `null` with anything else unknown.
fn to_json(val: ValueRef<'_>) -> serde_json::Value {
    use serde_json::Value as Json;

    match val {
        ValueRef::Boolean(b) => Json::Bool(b),
        ValueRef::Int(n) => Json::from(n),
        ValueRef::BigInt(n) => Json::from(n),
        ValueRef::HugeInt(n) => i64::try_from(n)
            .map(Json::from)
            .unwrap_or_else(|_| Json::String(n.to_string())),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        ValueRef::Text(bytes) => Json::String(String::from_utf8_lossy(bytes).into_owned()),
        _ => Json::Null,
    }
}
