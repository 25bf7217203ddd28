//! SQL builder with parameterized query construction.
//!
//! All caller-supplied values go through DuckDB's parameter binding (`?` placeholders),
//! never through string interpolation. Builder methods return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use mtg_price_tracker::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("price_history")
//!     .where_eq("user_id", "user-1")
//!     .where_eq("card_id", "card-1")
//!     .order_by(&["checked_at DESC"])
//!     .limit(1)
//!     .build();
//! ```

use duckdb::types::{ToSql, ToSqlOutput, Value};

// ---------------------------------------------------------------------------
// SqlValue
// ---------------------------------------------------------------------------

/// A typed parameter value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Int(i64),
    Real(f64),
    Bool(bool),
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> duckdb::Result<ToSqlOutput<'_>> {
        let value = match self {
            SqlValue::Null => Value::Null,
            SqlValue::Text(s) => Value::Text(s.clone()),
            SqlValue::Int(n) => Value::BigInt(*n),
            SqlValue::Real(f) => Value::Double(*f),
            SqlValue::Bool(b) => Value::Boolean(*b),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<&String> for SqlValue {
    fn from(s: &String) -> Self {
        SqlValue::Text(s.clone())
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int(n)
    }
}

impl From<f64> for SqlValue {
    fn from(f: f64) -> Self {
        SqlValue::Real(f)
    }
}

impl From<bool> for SqlValue {
    fn from(b: bool) -> Self {
        SqlValue::Bool(b)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

// ---------------------------------------------------------------------------
// SqlBuilder
// ---------------------------------------------------------------------------

/// Builds parameterized SELECT queries.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    joins: Vec<String>,
    where_clauses: Vec<String>,
    params: Vec<SqlValue>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            joins: Vec::new(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a JOIN clause, e.g. `"JOIN collections c ON cc.collection_id = c.id"`.
    pub fn join(&mut self, clause: &str) -> &mut Self {
        self.joins.push(clause.to_string());
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.into());
        self
    }

    /// Add a strict less-than condition: `{column} < ?`.
    pub fn where_lt(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.where_clauses.push(format!("{} < ?", column));
        self.params.push(value.into());
        self
    }

    /// Add a strict greater-than condition: `{column} > ?`.
    pub fn where_gt(&mut self, column: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.where_clauses.push(format!("{} > ?", column));
        self.params.push(value.into());
        self
    }

    /// Add ORDER BY clauses (e.g. `"checked_at DESC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Set the maximum number of rows to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<SqlValue>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        for j in &self.joins {
            parts.push(j.clone());
        }

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }
}
