// src/handlers/aqa_reading.rs

use chrono::Utc;
use serde_json::{Value, json};

use super::{assign_students, enrolled_students, ids, stored_id};
use crate::{
    analytics::{ResultRecord, aggregate},
    error::HandlerError,
    models::{
        aqa::{
            AqaAnalyticsQuery, AqaAssignmentLink, AqaResultsQuery, AssessmentLevel,
            CreateAqaAssignmentRequest, NewAqaAssignment,
        },
        tables::{AQA_ASSESSMENTS, AQA_ASSIGNMENTS, AQA_RESPONSES, AQA_RESULTS, ASSIGNMENTS, PROFILES},
        to_row,
    },
    store::{DataStore, Embed, Select},
};

/// Creates the assignment, its AQA link row and progress rows for the
/// targeted students.
///
/// A single `student_id` wins over the class roster. Without either, no
/// progress rows are written.
pub async fn create_assignment(
    store: &dyn DataStore,
    req: CreateAqaAssignmentRequest,
) -> Result<Value, HandlerError> {
    let assessment = store
        .select_one(
            &Select::from(AQA_ASSESSMENTS)
                .eq("level", req.assessment_level)
                .eq("is_active", true),
        )
        .await?
        .ok_or_else(|| {
            HandlerError::NotFound(format!(
                "Active AQA reading assessment for level {}",
                req.assessment_level.as_str()
            ))
        })?;
    let assessment_id = stored_id(AQA_ASSESSMENTS, &assessment)?;

    let new_assignment = NewAqaAssignment::new(&req, Utc::now());
    let assignment = store
        .insert_one(ASSIGNMENTS, to_row("assignment", &new_assignment)?)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create AQA assignment: {:?}", e);
            e
        })?;
    let assignment_id = stored_id(ASSIGNMENTS, &assignment)?;

    let link = AqaAssignmentLink::new(&req, &new_assignment, &assignment_id, &assessment_id);
    let aqa_assignment = store
        .insert_one(AQA_ASSIGNMENTS, to_row("AQA assignment", &link)?)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to link assignment {} to assessment {}: {:?}",
                assignment_id,
                assessment_id,
                e
            );
            e
        })?;

    let students = match (&req.student_id, &req.class_id) {
        (Some(student_id), _) => vec![student_id.clone()],
        (None, Some(class_id)) => enrolled_students(store, class_id).await?,
        (None, None) => Vec::new(),
    };
    let assigned = assign_students(store, "AQA assignment", &assignment_id, &students).await?;

    tracing::info!(
        "Created AQA {} assignment {} for {} students",
        req.assessment_level.as_str(),
        assignment_id,
        assigned
    );

    Ok(json!({
        "success": true,
        "assignment": assignment,
        "aqa_assignment": aqa_assignment,
        "students_assigned": assigned,
    }))
}

/// Ids of the teacher's AQA assignments, narrowed by class and level.
async fn teacher_assignments(
    store: &dyn DataStore,
    teacher_id: &str,
    class_id: Option<&str>,
    level: Option<AssessmentLevel>,
) -> Result<Vec<Value>, HandlerError> {
    let mut query = Select::from(AQA_ASSIGNMENTS)
        .eq("teacher_id", teacher_id)
        .eq_opt("class_id", class_id);
    if let Some(level) = level {
        let assessments = store
            .select(&Select::from(AQA_ASSESSMENTS).eq("level", level))
            .await?;
        query = query.is_in("assessment_id", ids(&assessments));
    }
    Ok(ids(&store.select(&query).await?))
}

fn assignment_embed() -> Embed {
    Embed::one(AQA_ASSIGNMENTS, "assignment", "assignment_id", "id").with(Embed::one(
        AQA_ASSESSMENTS,
        "assessment",
        "assessment_id",
        "id",
    ))
}

fn student_embed() -> Embed {
    Embed::one(PROFILES, "student", "student_id", "id")
}

pub async fn get_results(
    store: &dyn DataStore,
    req: AqaResultsQuery,
) -> Result<Value, HandlerError> {
    let assignments = teacher_assignments(
        store,
        &req.teacher_id,
        req.class_id.as_deref(),
        req.assessment_level,
    )
    .await?;

    let mut query = Select::from(AQA_RESULTS)
        .is_in("assignment_id", assignments)
        .eq_opt("student_id", req.student_id);
    if let Some(from) = req.date_from {
        query = query.gte("submission_date", from);
    }
    if let Some(to) = req.date_to {
        query = query.lte("submission_date", to);
    }
    let query = query
        .newest_first("submission_date")
        .embed(assignment_embed())
        .embed(student_embed());

    let results = store.select(&query).await?;
    Ok(json!({ "results": results }))
}

/// Completed results grouped by question type, theme, topic or student.
pub async fn get_analytics(
    store: &dyn DataStore,
    req: AqaAnalyticsQuery,
) -> Result<Value, HandlerError> {
    let assignments = teacher_assignments(
        store,
        &req.teacher_id,
        req.class_id.as_deref(),
        req.assessment_level,
    )
    .await?;

    let query = Select::from(AQA_RESULTS)
        .is_in("assignment_id", assignments)
        .eq("status", "completed")
        .eq_opt("student_id", req.student_id)
        .embed(assignment_embed())
        .embed(student_embed())
        .embed(Embed::many(AQA_RESPONSES, "responses", "id", "result_id"));

    let rows = store.select(&query).await?;
    let records: Vec<ResultRecord> = rows.iter().map(ResultRecord::from_aqa_row).collect();

    Ok(json!({
        "analytics": aggregate(&records, req.group_by.key()),
        "group_by": req.group_by.as_str(),
        "total_results": records.len(),
    }))
}
