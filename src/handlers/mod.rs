// src/handlers/mod.rs

//! One handler per catalogued operation, plus the HTTP endpoints.
//!
//! Operation handlers take the injected store and a typed request and
//! return the JSON payload placed in the success envelope.

pub mod api;
pub mod aqa_reading;
pub mod assignment;
pub mod competition;
pub mod game_session;
pub mod reading;
pub mod vocabulary;

use serde_json::Value;

use crate::{
    error::HandlerError,
    models::{
        progress::{PROGRESS_KEY, ProgressUpdate, initial_progress, merge_progress},
        row_id,
        tables::{PROGRESS, STUDENT_CLASSES},
    },
    store::{DataStore, Row, Select, StoreError},
    tools::ToolRequest,
};

/// Runs the handler matching `request`.
pub async fn run(store: &dyn DataStore, request: ToolRequest) -> Result<Value, HandlerError> {
    match request {
        ToolRequest::CreateAssignment(req) => assignment::create_assignment(store, req).await,
        ToolRequest::GetAssignment(req) => assignment::get_assignment(store, req).await,
        ToolRequest::UpdateAssignmentProgress(req) => assignment::update_progress(store, req).await,
        ToolRequest::GetAssignmentAnalytics(req) => assignment::get_analytics(store, req).await,
        ToolRequest::CreateVocabularyList(req) => vocabulary::create_list(store, req).await,
        ToolRequest::GetVocabularyLists(req) => vocabulary::list_lists(store, req).await,
        ToolRequest::GetVocabularyForGame(req) => vocabulary::items_for_game(store, req).await,
        ToolRequest::StartGameSession(req) => game_session::start_session(store, req).await,
        ToolRequest::EndGameSession(req) => game_session::end_session(store, req).await,
        ToolRequest::GetCrossGameLeaderboard(req) => game_session::leaderboard(store, req).await,
        ToolRequest::GetStudentAnalytics(req) => game_session::student_analytics(store, req).await,
        ToolRequest::GetClassAnalytics(req) => game_session::class_analytics(store, req).await,
        ToolRequest::CreateCompetition(req) => competition::create_competition(store, req).await,
        ToolRequest::GetActiveCompetitions(req) => competition::active_competitions(store, req).await,
        ToolRequest::CreateAqaReadingAssignment(req) => {
            aqa_reading::create_assignment(store, req).await
        }
        ToolRequest::GetAqaReadingResults(req) => aqa_reading::get_results(store, req).await,
        ToolRequest::GetAqaReadingAnalytics(req) => aqa_reading::get_analytics(store, req).await,
        ToolRequest::CreateReadingComprehensionTask(req) => reading::create_task(store, req).await,
        ToolRequest::GetReadingComprehensionTasks(req) => reading::list_tasks(store, req).await,
        ToolRequest::SaveReadingComprehensionResult(req) => reading::save_result(store, req).await,
        ToolRequest::GetReadingComprehensionAnalytics(req) => reading::get_analytics(store, req).await,
    }
}

/// Id of a row the store just wrote.
fn stored_id(table: &'static str, row: &Row) -> Result<String, HandlerError> {
    row_id(row)
        .map(str::to_string)
        .ok_or_else(|| StoreError::Malformed(table.to_string()).into())
}

/// Ids of the students enrolled in `class_id`.
async fn enrolled_students(store: &dyn DataStore, class_id: &str) -> Result<Vec<String>, HandlerError> {
    let rows = store
        .select(&Select::from(STUDENT_CLASSES).eq("class_id", class_id))
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch students of class {}: {:?}", class_id, e);
            e
        })?;
    Ok(rows
        .iter()
        .filter_map(|row| row.get("student_id").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

/// Second phase of an assignment fan-out: one not-started progress row per
/// student. Every row is attempted; nothing already written is undone.
///
/// Returns the number of students assigned, or `PartialWrite` naming the
/// students whose rows failed.
async fn assign_students(
    store: &dyn DataStore,
    entity: &'static str,
    assignment_id: &str,
    students: &[String],
) -> Result<usize, HandlerError> {
    let mut failed = Vec::new();
    for student in students {
        if let Err(e) = store
            .insert(PROGRESS, vec![initial_progress(assignment_id, student)])
            .await
        {
            tracing::error!(
                "Failed to create progress for student {} on {} {}: {:?}",
                student,
                entity,
                assignment_id,
                e
            );
            failed.push(student.clone());
        }
    }

    if failed.is_empty() {
        Ok(students.len())
    } else {
        Err(HandlerError::PartialWrite {
            entity,
            id: assignment_id.to_string(),
            attempted: students.len(),
            failed,
        })
    }
}

/// Read-modify-write of the `(assignment_id, student_id)` progress row.
async fn record_progress(store: &dyn DataStore, update: ProgressUpdate) -> Result<Row, HandlerError> {
    let existing = store
        .select_one(
            &Select::from(PROGRESS)
                .eq("assignment_id", update.assignment_id.as_str())
                .eq("student_id", update.student_id.as_str()),
        )
        .await?;
    let merged = merge_progress(existing.as_ref(), &update, chrono::Utc::now());
    let stored = store.upsert(PROGRESS, merged, PROGRESS_KEY).await.map_err(|e| {
        tracing::error!(
            "Failed to upsert progress for student {} on assignment {}: {:?}",
            update.student_id,
            update.assignment_id,
            e
        );
        e
    })?;
    Ok(stored)
}

/// String ids of `rows`, as filter values.
fn ids(rows: &[Row]) -> Vec<Value> {
    rows.iter()
        .filter_map(|row| row.get("id").cloned())
        .filter(|id| !id.is_null())
        .collect()
}
