// src/handlers/assignment.rs

use serde_json::{Value, json};

use super::{assign_students, enrolled_students, record_progress, stored_id};
use crate::{
    analytics::session::AssignmentSummary,
    error::HandlerError,
    models::{
        assignment::{AssignmentAnalyticsRequest, CreateAssignmentRequest, GetAssignmentRequest},
        progress::UpdateProgressRequest,
        tables::{
            ASSIGNMENT_VOCAB_ITEMS, ASSIGNMENT_VOCAB_LISTS, ASSIGNMENTS, CLASSES, PROFILES,
            PROGRESS, VOCAB_LISTS, VOCABULARY,
        },
        to_row,
    },
    store::{DataStore, Embed, Select},
};

/// Creates an assignment, then a not-started progress row for every student
/// enrolled in its class.
///
/// * The assignment is written first; if that fails nothing else is written.
/// * Progress rows are only attempted when the class has students.
pub async fn create_assignment(
    store: &dyn DataStore,
    req: CreateAssignmentRequest,
) -> Result<Value, HandlerError> {
    let row = to_row("assignment", &req)?;
    let assignment = store.insert_one(ASSIGNMENTS, row).await.map_err(|e| {
        tracing::error!("Failed to create assignment: {:?}", e);
        e
    })?;
    let assignment_id = stored_id(ASSIGNMENTS, &assignment)?;

    let students = enrolled_students(store, &req.class_id).await?;
    let assigned = assign_students(store, "assignment", &assignment_id, &students).await?;

    tracing::info!(
        "Created assignment {} for {} students",
        assignment_id,
        assigned
    );

    Ok(json!({
        "success": true,
        "assignment": assignment,
        "students_assigned": assigned,
    }))
}

/// Fetches an assignment with its class, list and assigned vocabulary.
pub async fn get_assignment(
    store: &dyn DataStore,
    req: GetAssignmentRequest,
) -> Result<Value, HandlerError> {
    let query = Select::from(ASSIGNMENTS)
        .eq("id", req.assignment_id.as_str())
        .embed(Embed::one(CLASSES, "class", "class_id", "id"))
        .embed(Embed::one(VOCAB_LISTS, "vocabulary_list", "vocabulary_list_id", "id"))
        .embed(
            Embed::many(ASSIGNMENT_VOCAB_LISTS, "vocabulary_lists", "id", "assignment_id").with(
                Embed::many(ASSIGNMENT_VOCAB_ITEMS, "items", "id", "assignment_list_id")
                    .with(Embed::one(VOCABULARY, "vocabulary", "vocabulary_id", "id")),
            ),
        );

    let assignment = store
        .select_one(&query)
        .await?
        .ok_or_else(|| HandlerError::NotFound(format!("Assignment {}", req.assignment_id)))?;

    Ok(json!({ "assignment": assignment }))
}

pub async fn update_progress(
    store: &dyn DataStore,
    req: UpdateProgressRequest,
) -> Result<Value, HandlerError> {
    let progress = record_progress(store, req.into()).await?;
    Ok(json!({ "success": true, "progress": progress }))
}

/// Completion and score figures over every progress row of an assignment.
pub async fn get_analytics(
    store: &dyn DataStore,
    req: AssignmentAnalyticsRequest,
) -> Result<Value, HandlerError> {
    let assignment = store
        .select_one(&Select::from(ASSIGNMENTS).eq("id", req.assignment_id.as_str()))
        .await?
        .ok_or_else(|| HandlerError::NotFound(format!("Assignment {}", req.assignment_id)))?;

    let progress = store
        .select(
            &Select::from(PROGRESS)
                .eq("assignment_id", req.assignment_id.as_str())
                .embed(Embed::one(PROFILES, "student", "student_id", "id")),
        )
        .await?;

    let summary = AssignmentSummary::from_progress(&progress);

    Ok(json!({
        "analytics": {
            "assignment": assignment,
            "summary": summary,
            "progress": progress,
        }
    }))
}
