// src/handlers/reading.rs

use chrono::Utc;
use serde_json::{Value, json};

use super::{enrolled_students, ids, record_progress, stored_id};
use crate::{
    analytics::{ResultRecord, aggregate},
    error::HandlerError,
    models::{
        progress::ProgressUpdate,
        reading::{
            CreateReadingTaskRequest, NewQuestionResult, NewReadingQuestion, NewReadingResult,
            NewReadingTask, ReadingAnalyticsQuery, ReadingTasksQuery, SaveReadingResultRequest,
        },
        tables::{PROFILES, READING_QUESTION_RESULTS, READING_QUESTIONS, READING_RESULTS, READING_TASKS},
        to_row,
    },
    store::{DataStore, Embed, Select},
    utils::time::timestamp_value,
};

fn questions_embed() -> Embed {
    Embed::many(READING_QUESTIONS, "questions", "id", "task_id")
}

/// Creates a task, then its questions numbered in the order given.
pub async fn create_task(
    store: &dyn DataStore,
    req: CreateReadingTaskRequest,
) -> Result<Value, HandlerError> {
    let row = to_row(
        "reading task",
        &NewReadingTask::new(&req, timestamp_value(Utc::now())),
    )?;
    let mut task = store.insert_one(READING_TASKS, row).await.map_err(|e| {
        tracing::error!("Failed to create reading task: {:?}", e);
        e
    })?;
    let task_id = stored_id(READING_TASKS, &task)?;

    let rows = req
        .questions
        .iter()
        .enumerate()
        .map(|(index, input)| {
            to_row(
                "reading question",
                &NewReadingQuestion::numbered(&task_id, index, input),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    let questions = store.insert(READING_QUESTIONS, rows).await.map_err(|e| {
        tracing::error!("Failed to create questions of reading task {}: {:?}", task_id, e);
        e
    })?;

    task.insert("questions".into(), json!(questions));
    Ok(json!({ "success": true, "task": task }))
}

/// Tasks matching every given filter, newest first or shuffled.
pub async fn list_tasks(
    store: &dyn DataStore,
    req: ReadingTasksQuery,
) -> Result<Value, HandlerError> {
    let query = Select::from(READING_TASKS)
        .eq_opt("language", req.language)
        .eq_opt("curriculum_level", req.curriculum_level)
        .eq_opt("exam_board", req.exam_board)
        .eq_opt("category", req.category)
        .eq_opt("subcategory", req.subcategory)
        .eq_opt("difficulty", req.difficulty)
        .eq_opt("theme_topic", req.theme_topic)
        .embed(questions_embed());
    let query = if req.random {
        query.random()
    } else {
        query.newest_first("created_at")
    };

    let tasks = store.select(&query.limit(req.limit)).await?;
    Ok(json!({ "tasks": tasks }))
}

/// Stores a result with its per-question answers.
///
/// When the result belongs to an assignment the student's progress row is
/// completed with this score, keeping any better earlier one.
pub async fn save_result(
    store: &dyn DataStore,
    req: SaveReadingResultRequest,
) -> Result<Value, HandlerError> {
    let row = to_row(
        "reading result",
        &NewReadingResult::new(&req, timestamp_value(Utc::now())),
    )?;
    let result = store.insert_one(READING_RESULTS, row).await.map_err(|e| {
        tracing::error!("Failed to save reading result for student {}: {:?}", req.student_id, e);
        e
    })?;
    let result_id = stored_id(READING_RESULTS, &result)?;

    if !req.question_results.is_empty() {
        let rows = req
            .question_results
            .iter()
            .map(|answer| {
                to_row(
                    "question result",
                    &NewQuestionResult {
                        result_id: &result_id,
                        answer,
                    },
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        store
            .insert(READING_QUESTION_RESULTS, rows)
            .await
            .map_err(|e| {
                tracing::error!("Failed to save question results of {}: {:?}", result_id, e);
                e
            })?;
    }

    let progress = match &req.assignment_id {
        Some(assignment_id) => {
            let update = ProgressUpdate {
                assignment_id: assignment_id.clone(),
                student_id: req.student_id.clone(),
                score: req.score_percentage,
                accuracy: req.accuracy(),
                time_spent: req.time_spent_seconds,
                completed: true,
                progress_data: None,
            };
            Some(record_progress(store, update).await?)
        }
        None => None,
    };

    Ok(json!({
        "success": true,
        "result_id": result_id,
        "progress": progress,
    }))
}

/// Results grouped by student, difficulty, category or language.
///
/// Task-level filters (language, difficulty, author) and class membership
/// are resolved to id sets first.
pub async fn get_analytics(
    store: &dyn DataStore,
    req: ReadingAnalyticsQuery,
) -> Result<Value, HandlerError> {
    let mut query = Select::from(READING_RESULTS).eq_opt("student_id", req.student_id);

    if req.language.is_some() || req.difficulty.is_some() || req.teacher_id.is_some() {
        let tasks = store
            .select(
                &Select::from(READING_TASKS)
                    .eq_opt("language", req.language)
                    .eq_opt("difficulty", req.difficulty)
                    .eq_opt("created_by", req.teacher_id),
            )
            .await?;
        query = query.is_in("task_id", ids(&tasks));
    }
    if let Some(class_id) = &req.class_id {
        let students = enrolled_students(store, class_id).await?;
        query = query.is_in("student_id", students);
    }
    if let Some(from) = req.date_from {
        query = query.gte("completed_at", from);
    }
    if let Some(to) = req.date_to {
        query = query.lte("completed_at", to);
    }
    let query = query
        .newest_first("completed_at")
        .embed(Embed::one(READING_TASKS, "task", "task_id", "id"))
        .embed(Embed::one(PROFILES, "student", "student_id", "id"));

    let rows = store.select(&query).await?;
    let records: Vec<ResultRecord> = rows.iter().map(ResultRecord::from_reading_row).collect();

    Ok(json!({
        "analytics": aggregate(&records, req.group_by.key()),
        "group_by": req.group_by.as_str(),
        "total_results": records.len(),
    }))
}
