// src/store/memory.rs

//! In-process [`DataStore`] used by tests and local runs without Postgres.

use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use serde_json::Value;
use uuid::Uuid;

use super::{
    Cardinality, DataStore, Direction, Embed, Filter, Order, Row, Select, StoreError,
    compare_values, values_equal,
};
use crate::utils::time::timestamp_value;

/// Rejects writes to `table` whose `column` equals `value`.
#[derive(Debug, Clone)]
struct WriteFault {
    table: &'static str,
    column: Option<(&'static str, Value)>,
}

#[derive(Debug, Default)]
struct Inner {
    tables: HashMap<&'static str, Vec<Row>>,
    faults: Vec<WriteFault>,
    writes: usize,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds `table` with rows as-is (no generated columns, no write count).
    pub fn seed(&self, table: &'static str, rows: impl IntoIterator<Item = Value>) {
        let mut inner = self.lock();
        let entries = inner.tables.entry(table).or_default();
        entries.extend(rows.into_iter().filter_map(|v| match v {
            Value::Object(row) => Some(row),
            _ => None,
        }));
    }

    /// Every row currently stored in `table`.
    pub fn rows(&self, table: &'static str) -> Vec<Row> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Number of successful write operations (insert, upsert, update) so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Makes every write to `table` fail.
    pub fn fail_writes_to(&self, table: &'static str) {
        self.lock().faults.push(WriteFault { table, column: None });
    }

    /// Makes writes to `table` fail for rows whose `column` equals `value`.
    pub fn fail_writes_where(&self, table: &'static str, column: &'static str, value: impl Into<Value>) {
        self.lock().faults.push(WriteFault {
            table,
            column: Some((column, value.into())),
        });
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn check_faults(&self, table: &'static str, row: &Row) -> Result<(), StoreError> {
        for fault in self.faults.iter().filter(|f| f.table == table) {
            let hit = match &fault.column {
                None => true,
                Some((column, value)) => row.get(*column).is_some_and(|v| values_equal(v, value)),
            };
            if hit {
                return Err(StoreError::Rejected {
                    table: table.to_string(),
                    reason: "write fault injected".to_string(),
                });
            }
        }
        Ok(())
    }

    fn matching(&self, table: &'static str, filters: &[Filter]) -> Vec<Row> {
        self.tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filters.iter().all(|f| matches(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn attach(&self, row: &mut Row, embeds: &[Embed]) {
        for embed in embeds {
            let key = row.get(embed.local).cloned().unwrap_or(Value::Null);
            let mut related: Vec<Row> = if key.is_null() {
                Vec::new()
            } else {
                self.matching(embed.table, &[Filter::Eq(embed.foreign, key)])
            };
            for child in related.iter_mut() {
                self.attach(child, &embed.embeds);
            }
            let value = match embed.cardinality {
                Cardinality::One => related.into_iter().next().map(Value::Object).unwrap_or(Value::Null),
                Cardinality::Many => Value::Array(related.into_iter().map(Value::Object).collect()),
            };
            row.insert(embed.alias.to_string(), value);
        }
    }
}

fn column<'a>(row: &'a Row, name: &str) -> &'a Value {
    row.get(name).unwrap_or(&Value::Null)
}

fn matches(row: &Row, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(name, value) => values_equal(column(row, name), value),
        Filter::Compare(name, op, value) => compare_values(column(row, name), value)
            .is_some_and(|ordering| op.holds(ordering)),
        Filter::In(name, values) => values.iter().any(|v| values_equal(column(row, name), v)),
        Filter::NotNull(name) => !column(row, name).is_null(),
        Filter::AnyOf(inner) => inner.iter().any(|f| matches(row, f)),
    }
}

fn sort(rows: &mut [Row], order: &[Order]) {
    if order.iter().any(|o| matches!(o, Order::Random)) {
        rows.shuffle(&mut rand::rng());
        return;
    }
    rows.sort_by(|a, b| {
        for item in order {
            if let Order::By(name, direction) = item {
                let (left, right) = (column(a, name), column(b, name));
                // Nulls sort last in both directions, as in Postgres `NULLS LAST`.
                let ordering = match (left.is_null(), right.is_null()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => return Ordering::Greater,
                    (false, true) => return Ordering::Less,
                    (false, false) => compare_values(left, right).unwrap_or(Ordering::Equal),
                };
                let ordering = match direction {
                    Direction::Asc => ordering,
                    Direction::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
        Ordering::Equal
    });
}

fn with_generated_columns(mut row: Row) -> Row {
    row.entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    row.entry("created_at")
        .or_insert_with(|| timestamp_value(Utc::now()));
    row
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn select(&self, query: &Select) -> Result<Vec<Row>, StoreError> {
        let inner = self.lock();
        let mut rows = inner.matching(query.table, &query.filters);
        sort(&mut rows, &query.order);
        if let Some(limit) = query.limit {
            rows.truncate(usize::try_from(limit).unwrap_or(0));
        }
        for row in rows.iter_mut() {
            inner.attach(row, &query.embeds);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &'static str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let mut inner = self.lock();
        for row in &rows {
            inner.check_faults(table, row)?;
        }
        let stored: Vec<Row> = rows.into_iter().map(with_generated_columns).collect();
        inner.tables.entry(table).or_default().extend(stored.iter().cloned());
        inner.writes += 1;
        Ok(stored)
    }

    async fn upsert(
        &self,
        table: &'static str,
        row: Row,
        conflict: &[&'static str],
    ) -> Result<Row, StoreError> {
        let mut inner = self.lock();
        inner.check_faults(table, &row)?;
        let entries = inner.tables.entry(table).or_default();
        let existing = entries.iter_mut().find(|candidate| {
            conflict
                .iter()
                .all(|key| values_equal(column(candidate, key), column(&row, key)))
        });
        let stored = match existing {
            Some(current) => {
                current.extend(row);
                current.clone()
            }
            None => {
                let fresh = with_generated_columns(row);
                entries.push(fresh.clone());
                fresh
            }
        };
        inner.writes += 1;
        Ok(stored)
    }

    async fn update(
        &self,
        table: &'static str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, StoreError> {
        let mut inner = self.lock();
        inner.check_faults(table, &patch)?;
        let mut updated = Vec::new();
        if let Some(rows) = inner.tables.get_mut(table) {
            for row in rows.iter_mut().filter(|row| filters.iter().all(|f| matches(row, f))) {
                row.extend(patch.clone());
                updated.push(row.clone());
            }
        }
        inner.writes += 1;
        Ok(updated)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
