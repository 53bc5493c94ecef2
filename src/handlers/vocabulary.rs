// src/handlers/vocabulary.rs

use rand::seq::SliceRandom;
use serde_json::{Value, json};

use super::stored_id;
use crate::{
    error::HandlerError,
    models::{
        tables::{VOCAB_ITEMS, VOCAB_LISTS},
        to_row,
        vocabulary::{
            CreateVocabularyListRequest, GameCompatibility, NewVocabularyList,
            VocabularyForGameRequest, VocabularyListsQuery,
        },
    },
    store::{DataStore, Embed, Select},
};

fn items_embed() -> Embed {
    Embed::many(VOCAB_ITEMS, "items", "id", "list_id")
}

/// Creates a list, then its items in one batch.
pub async fn create_list(
    store: &dyn DataStore,
    req: CreateVocabularyListRequest,
) -> Result<Value, HandlerError> {
    let list_row = to_row("vocabulary list", &NewVocabularyList::from(&req))?;
    let mut list = store.insert_one(VOCAB_LISTS, list_row).await.map_err(|e| {
        tracing::error!("Failed to create vocabulary list: {:?}", e);
        e
    })?;
    let list_id = stored_id(VOCAB_LISTS, &list)?;

    let mut rows = Vec::with_capacity(req.items.len());
    for item in &req.items {
        let mut row = to_row("vocabulary item", item)?;
        row.insert("list_id".into(), json!(list_id));
        rows.push(row);
    }
    let items = store.insert(VOCAB_ITEMS, rows).await.map_err(|e| {
        tracing::error!("Failed to create items of vocabulary list {}: {:?}", list_id, e);
        e
    })?;

    list.insert("items".into(), json!(items));
    Ok(json!({ "success": true, "list": list }))
}

/// Lists matching every given filter, newest first.
pub async fn list_lists(
    store: &dyn DataStore,
    req: VocabularyListsQuery,
) -> Result<Value, HandlerError> {
    let query = Select::from(VOCAB_LISTS)
        .eq_opt("teacher_id", req.teacher_id)
        .eq_opt("language", req.language)
        .eq_opt("content_type", req.content_type)
        .eq_opt("is_public", req.is_public)
        .newest_first("created_at")
        .limit(req.limit)
        .embed(items_embed());

    let lists = store.select(&query).await?;
    Ok(json!({ "lists": lists }))
}

/// Items of a list that the requested game can show.
///
/// Sentences are dropped for word-only games; the rest is optionally
/// shuffled and capped by both the requested limit and the game's maximum.
pub async fn items_for_game(
    store: &dyn DataStore,
    req: VocabularyForGameRequest,
) -> Result<Value, HandlerError> {
    let compatibility = GameCompatibility::lookup(&req.game_type)
        .ok_or_else(|| HandlerError::Unsupported(format!("Unknown game type: {}", req.game_type)))?;

    let mut list = store
        .select_one(
            &Select::from(VOCAB_LISTS)
                .eq("id", req.list_id.as_str())
                .embed(items_embed()),
        )
        .await?
        .ok_or_else(|| HandlerError::NotFound(format!("Vocabulary list {}", req.list_id)))?;

    let mut items: Vec<Value> = match list.remove("items") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    items.retain(|item| compatibility.accepts(item.get("type").and_then(Value::as_str)));
    if req.randomize {
        items.shuffle(&mut rand::rng());
    }
    items.truncate(compatibility.cap(req.limit));

    let filtered_count = items.len();
    list.insert("items".into(), Value::Array(items));

    Ok(json!({
        "list": list,
        "compatibility": compatibility,
        "filtered_count": filtered_count,
    }))
}
