// src/store/mod.rs

//! Abstract data-store boundary.
//!
//! Handlers never write SQL. They describe what they want with [`Select`],
//! [`Filter`] and [`Embed`] and hand plain JSON rows to a [`DataStore`].
//! Table and column names are `&'static str` so only code, never callers,
//! can name them.

pub mod memory;
pub mod postgres;

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// One record as seen through the boundary: a JSON object keyed by column.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid identifier `{0}`")]
    InvalidIdentifier(String),

    #[error("write to `{table}` rejected: {reason}")]
    Rejected { table: String, reason: String },

    #[error("malformed row from `{0}`")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Gte,
    Lte,
}

impl Comparison {
    pub fn sql(self) -> &'static str {
        match self {
            Comparison::Gte => ">=",
            Comparison::Lte => "<=",
        }
    }

    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Gte => ordering != Ordering::Less,
            Comparison::Lte => ordering != Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    Compare(&'static str, Comparison, Value),
    /// Set membership. An empty set matches nothing.
    In(&'static str, Vec<Value>),
    NotNull(&'static str),
    /// Disjunction of the inner filters. An empty list matches nothing.
    AnyOf(Vec<Filter>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    By(&'static str, Direction),
    Random,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// A single related row (or `null`).
    One,
    /// An array of related rows (possibly empty).
    Many,
}

/// A related table attached to every returned row under `alias`, joined on
/// `related.foreign == parent.local`.
#[derive(Debug, Clone, PartialEq)]
pub struct Embed {
    pub table: &'static str,
    pub alias: &'static str,
    pub local: &'static str,
    pub foreign: &'static str,
    pub cardinality: Cardinality,
    pub embeds: Vec<Embed>,
}

impl Embed {
    pub fn one(
        table: &'static str,
        alias: &'static str,
        local: &'static str,
        foreign: &'static str,
    ) -> Self {
        Self {
            table,
            alias,
            local,
            foreign,
            cardinality: Cardinality::One,
            embeds: Vec::new(),
        }
    }

    pub fn many(
        table: &'static str,
        alias: &'static str,
        local: &'static str,
        foreign: &'static str,
    ) -> Self {
        Self {
            cardinality: Cardinality::Many,
            ..Self::one(table, alias, local, foreign)
        }
    }

    pub fn with(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }
}

/// A read against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub table: &'static str,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<i64>,
    pub embeds: Vec<Embed>,
}

impl Select {
    pub fn from(table: &'static str) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            embeds: Vec::new(),
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filter(Filter::Eq(column, value.into()))
    }

    /// Adds an equality filter only when `value` is present.
    pub fn eq_opt<V: Into<Value>>(self, column: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    pub fn gte(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filter(Filter::Compare(column, Comparison::Gte, value.into()))
    }

    pub fn lte(self, column: &'static str, value: impl Into<Value>) -> Self {
        self.filter(Filter::Compare(column, Comparison::Lte, value.into()))
    }

    pub fn is_in<V: Into<Value>>(self, column: &'static str, values: Vec<V>) -> Self {
        self.filter(Filter::In(
            column,
            values.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn not_null(self, column: &'static str) -> Self {
        self.filter(Filter::NotNull(column))
    }

    pub fn order_by(mut self, column: &'static str, direction: Direction) -> Self {
        self.order.push(Order::By(column, direction));
        self
    }

    pub fn newest_first(self, column: &'static str) -> Self {
        self.order_by(column, Direction::Desc)
    }

    pub fn random(mut self) -> Self {
        self.order.push(Order::Random);
        self
    }

    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }
}

/// The query interface every handler is written against.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn select(&self, query: &Select) -> Result<Vec<Row>, StoreError>;

    /// Inserts all rows and returns them as stored (with generated columns).
    async fn insert(&self, table: &'static str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError>;

    /// Inserts `row`, or overwrites the provided columns of the row that
    /// already has the same values in `conflict`.
    async fn upsert(
        &self,
        table: &'static str,
        row: Row,
        conflict: &[&'static str],
    ) -> Result<Row, StoreError>;

    /// Overwrites the provided columns of every row matching all filters.
    async fn update(
        &self,
        table: &'static str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    async fn select_one(&self, query: &Select) -> Result<Option<Row>, StoreError> {
        let query = query.clone().limit(Some(1));
        Ok(self.select(&query).await?.into_iter().next())
    }

    async fn insert_one(&self, table: &'static str, row: Row) -> Result<Row, StoreError> {
        self.insert(table, vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Malformed(table.to_string()))
    }
}

/// Orders two JSON scalars the way the stores compare column values:
/// numbers numerically, timestamps chronologically, other strings
/// lexicographically. Values of different kinds are unordered.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => {
            match (parse_instant(a), parse_instant(b)) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => Some(a.cmp(b)),
            }
        }
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Equality with numeric normalisation, so `1` and `1.0` match.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => {
            compare_values(left, right) == Some(Ordering::Equal)
        }
        _ => left == right,
    }
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    crate::utils::time::parse_timestamp(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn timestamps_compare_chronologically_across_offsets() {
        let a = json!("2025-03-01T10:00:00Z");
        let b = json!("2025-03-01T11:30:00+01:00");
        assert_eq!(compare_values(&a, &b), Some(Ordering::Less));
    }

    #[test]
    fn numbers_compare_across_representations() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert_eq!(compare_values(&json!(2), &json!(10.5)), Some(Ordering::Less));
    }

    #[test]
    fn mixed_kinds_are_unordered() {
        assert_eq!(compare_values(&json!("1"), &json!(1)), None);
    }

    #[test]
    fn eq_opt_skips_missing_filters() {
        let query = Select::from("tasks")
            .eq_opt("language", Some("french"))
            .eq_opt::<&str>("difficulty", None);
        assert_eq!(query.filters, vec![Filter::Eq("language", json!("french"))]);
    }
}
