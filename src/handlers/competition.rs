// src/handlers/competition.rs

use serde_json::{Value, json};

use crate::{
    error::HandlerError,
    models::{
        competition::{ActiveCompetitionsQuery, CreateCompetitionRequest},
        tables::COMPETITIONS,
        to_row,
    },
    store::{DataStore, Direction, Filter, Select},
};

pub async fn create_competition(
    store: &dyn DataStore,
    req: CreateCompetitionRequest,
) -> Result<Value, HandlerError> {
    let row = to_row("competition", &req)?;
    let competition = store.insert_one(COMPETITIONS, row).await.map_err(|e| {
        tracing::error!("Failed to create competition: {:?}", e);
        e
    })?;
    Ok(json!({ "success": true, "competition": competition }))
}

/// Active competitions ending soonest first: public ones, plus the class's
/// own when a class is given.
pub async fn active_competitions(
    store: &dyn DataStore,
    req: ActiveCompetitionsQuery,
) -> Result<Value, HandlerError> {
    let visible = match req.class_id {
        Some(class_id) => Filter::AnyOf(vec![
            Filter::Eq("class_id", json!(class_id)),
            Filter::Eq("is_public", json!(true)),
        ]),
        None => Filter::Eq("is_public", json!(true)),
    };
    let query = Select::from(COMPETITIONS)
        .eq("status", "active")
        .filter(visible)
        .order_by("end_date", Direction::Asc);

    let competitions = store.select(&query).await?;
    Ok(json!({ "competitions": competitions }))
}
