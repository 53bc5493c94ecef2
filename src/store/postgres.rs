// src/store/postgres.rs

//! Postgres implementation of [`DataStore`].
//!
//! Rows travel as `jsonb`: every table is read through `to_jsonb(alias)` and
//! written through `jsonb_populate_record(set)`, so one code path serves all
//! tables without per-table structs. Predicates, sort keys and embed joins
//! use the typed columns directly. Values are always bound parameters; only
//! table and column identifiers are spliced into the SQL, and those are
//! checked by [`ident`] first.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};

use super::{
    Cardinality, DataStore, Direction, Embed, Filter, Order, Row, Select, StoreError,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Quotes a table or column name after checking it is a plain identifier.
fn ident(name: &str) -> Result<String, StoreError> {
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(format!("\"{}\"", name))
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Column names across all rows, in a stable order.
fn columns(rows: &[Row]) -> Result<Vec<String>, StoreError> {
    let names: BTreeSet<&String> = rows.iter().flat_map(|row| row.keys()).collect();
    names.into_iter().map(|name| ident(name)).collect()
}

fn rows_from(docs: Vec<Json<Value>>, table: &str) -> Result<Vec<Row>, StoreError> {
    docs.into_iter()
        .map(|Json(doc)| match doc {
            Value::Object(row) => Ok(row),
            _ => Err(StoreError::Malformed(table.to_string())),
        })
        .collect()
}

/// Pushes `value` converted to the declared type of `table.column`.
///
/// The value travels as a one-key jsonb object and is read back through
/// `jsonb_populate_record`, so timestamps, uuids and numbers are compared as
/// the column's own type rather than as json.
fn push_typed(
    builder: &mut QueryBuilder<'_, Postgres>,
    table: &str,
    column: &'static str,
    value: &Value,
) -> Result<(), StoreError> {
    let mut doc = Row::new();
    doc.insert(column.to_string(), value.clone());
    builder.push(format!("(jsonb_populate_record(NULL::{}, ", table));
    builder.push_bind(Json(Value::Object(doc)));
    builder.push(format!(")).{}", ident(column)?));
    Ok(())
}

/// Pushes a boolean predicate over the typed columns of `alias`, a row of
/// `table`.
fn push_filter(
    builder: &mut QueryBuilder<'_, Postgres>,
    table: &str,
    alias: &str,
    filter: &Filter,
) -> Result<(), StoreError> {
    match filter {
        Filter::Eq(column, value) => {
            builder.push(format!("{}.{} = ", alias, ident(column)?));
            push_typed(builder, table, column, value)?;
        }
        Filter::Compare(column, op, value) => {
            builder.push(format!("{}.{} {} ", alias, ident(column)?, op.sql()));
            push_typed(builder, table, column, value)?;
        }
        Filter::In(column, values) => {
            let col = ident(column)?;
            let docs = values
                .iter()
                .map(|value| {
                    let mut doc = Row::new();
                    doc.insert(column.to_string(), value.clone());
                    Value::Object(doc)
                })
                .collect();
            builder.push(format!(
                "{alias}.{col} = ANY(ARRAY(SELECT v.{col} FROM jsonb_populate_recordset(NULL::{table}, "
            ));
            builder.push_bind(Json(Value::Array(docs)));
            builder.push(") v))");
        }
        Filter::NotNull(column) => {
            builder.push(format!("{}.{} IS NOT NULL", alias, ident(column)?));
        }
        Filter::AnyOf(inner) => {
            if inner.is_empty() {
                builder.push("FALSE");
                return Ok(());
            }
            builder.push("(");
            for (i, f) in inner.iter().enumerate() {
                if i > 0 {
                    builder.push(" OR ");
                }
                push_filter(builder, table, alias, f)?;
            }
            builder.push(")");
        }
    }
    Ok(())
}

fn push_where(
    builder: &mut QueryBuilder<'_, Postgres>,
    table: &str,
    alias: &str,
    filters: &[Filter],
) -> Result<(), StoreError> {
    for (i, filter) in filters.iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        push_filter(builder, table, alias, filter)?;
    }
    Ok(())
}

/// Pushes the jsonb document for `alias`, with embedded relations merged in.
fn push_document(
    builder: &mut QueryBuilder<'_, Postgres>,
    alias: &str,
    embeds: &[Embed],
    depth: usize,
) -> Result<(), StoreError> {
    builder.push(format!("to_jsonb({})", alias));
    if embeds.is_empty() {
        return Ok(());
    }
    builder.push(" || jsonb_build_object(");
    for (i, embed) in embeds.iter().enumerate() {
        if i > 0 {
            builder.push(", ");
        }
        let child = format!("e{}_{}", depth, i);
        builder.push_bind(embed.alias);
        builder.push("::text, ");
        match embed.cardinality {
            Cardinality::One => {
                builder.push("(SELECT ");
                push_document(builder, &child, &embed.embeds, depth + 1)?;
            }
            Cardinality::Many => {
                builder.push("COALESCE((SELECT jsonb_agg(");
                push_document(builder, &child, &embed.embeds, depth + 1)?;
                builder.push(")");
            }
        }
        builder.push(format!(
            " FROM {table} {child} WHERE {child}.{foreign} = {alias}.{local}",
            table = ident(embed.table)?,
            foreign = ident(embed.foreign)?,
            local = ident(embed.local)?,
        ));
        match embed.cardinality {
            Cardinality::One => builder.push(" LIMIT 1)"),
            Cardinality::Many => builder.push("), '[]'::jsonb)"),
        };
    }
    builder.push(")");
    Ok(())
}

/// Builds the full read for `query`, up to but excluding execution.
fn select_sql(query: &Select) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    let table = ident(query.table)?;
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
    push_document(&mut builder, "t", &query.embeds, 0)?;
    builder.push(format!(" FROM {} t", table));
    push_where(&mut builder, &table, "t", &query.filters)?;

    for (i, order) in query.order.iter().enumerate() {
        builder.push(if i == 0 { " ORDER BY " } else { ", " });
        match order {
            Order::Random => {
                builder.push("RANDOM()");
            }
            Order::By(column, direction) => {
                builder.push(format!(
                    "t.{} {}",
                    ident(column)?,
                    match direction {
                        Direction::Asc => "ASC NULLS LAST",
                        Direction::Desc => "DESC NULLS LAST",
                    }
                ));
            }
        }
    }

    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    Ok(builder)
}

#[async_trait]
impl DataStore for PgStore {
    async fn select(&self, query: &Select) -> Result<Vec<Row>, StoreError> {
        let mut builder = select_sql(query)?;
        let docs: Vec<Json<Value>> = builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to select from {}: {:?}", query.table, e);
                StoreError::from(e)
            })?;

        rows_from(docs, query.table)
    }

    async fn insert(&self, table: &'static str, rows: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let table_ident = ident(table)?;
        let column_list = columns(&rows)?.join(", ");
        let payload = Value::Array(rows.into_iter().map(Value::Object).collect());

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {table} AS r ({cols}) SELECT {cols} FROM jsonb_populate_recordset(NULL::{table}, ",
            table = table_ident,
            cols = column_list,
        ));
        builder.push_bind(Json(payload));
        builder.push(") RETURNING to_jsonb(r)");

        let docs: Vec<Json<Value>> = builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert into {}: {:?}", table, e);
                StoreError::from(e)
            })?;

        rows_from(docs, table)
    }

    async fn upsert(
        &self,
        table: &'static str,
        row: Row,
        conflict: &[&'static str],
    ) -> Result<Row, StoreError> {
        let table_ident = ident(table)?;
        let cols = columns(std::slice::from_ref(&row))?;
        let keys = conflict
            .iter()
            .map(|c| ident(c))
            .collect::<Result<Vec<_>, _>>()?;
        let assignments = cols
            .iter()
            .map(|c| format!("{c} = EXCLUDED.{c}"))
            .collect::<Vec<_>>()
            .join(", ");

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {table} AS r ({cols}) SELECT {cols} FROM jsonb_populate_record(NULL::{table}, ",
            table = table_ident,
            cols = cols.join(", "),
        ));
        builder.push_bind(Json(Value::Object(row)));
        builder.push(format!(
            ") ON CONFLICT ({}) DO UPDATE SET {} RETURNING to_jsonb(r)",
            keys.join(", "),
            assignments
        ));

        let Json(doc): Json<Value> = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert into {}: {:?}", table, e);
                StoreError::from(e)
            })?;

        match doc {
            Value::Object(row) => Ok(row),
            _ => Err(StoreError::Malformed(table.to_string())),
        }
    }

    async fn update(
        &self,
        table: &'static str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, StoreError> {
        let table_ident = ident(table)?;
        let cols = columns(std::slice::from_ref(&patch))?.join(", ");
        if cols.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "UPDATE {table} AS r SET ({cols}) = (SELECT {cols} FROM jsonb_populate_record(NULL::{table}, ",
            table = table_ident,
            cols = cols,
        ));
        builder.push_bind(Json(Value::Object(patch)));
        builder.push("))");
        push_where(&mut builder, &table_ident, "r", filters)?;
        builder.push(" RETURNING to_jsonb(r)");

        let docs: Vec<Json<Value>> = builder
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update {}: {:?}", table, e);
                StoreError::from(e)
            })?;

        rows_from(docs, table)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
