// src/models/progress.rs

//! Per-student assignment progress, keyed on `(assignment_id, student_id)`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value, json};

use super::choice;
use crate::{store::Row, utils::time::timestamp_value};

/// Columns identifying one progress row.
pub const PROGRESS_KEY: &[&str] = &["assignment_id", "student_id"];

choice!(ProgressStatus {
    NotStarted => "not_started",
    InProgress => "in_progress",
    Completed => "completed",
});

impl ProgressStatus {
    /// Status stored on `row`; anything unrecognised counts as not started.
    pub fn of(row: &Row) -> Self {
        row.get("status")
            .cloned()
            .and_then(|status| serde_json::from_value(status).ok())
            .unwrap_or(ProgressStatus::NotStarted)
    }
}

/// DTO for recording a student's latest attempt at an assignment.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateProgressRequest {
    #[schemars(description = "Assignment UUID", extend("format" = "uuid"))]
    pub assignment_id: String,

    #[schemars(description = "Student UUID", extend("format" = "uuid"))]
    pub student_id: String,

    #[schemars(description = "Score achieved")]
    pub score: f64,

    #[schemars(description = "Accuracy percentage")]
    pub accuracy: f64,

    #[schemars(description = "Time spent in seconds")]
    pub time_spent: f64,

    #[schemars(description = "Whether the assignment is completed")]
    pub completed: bool,

    #[schemars(description = "Additional session data")]
    pub session_data: Option<Map<String, Value>>,
}

/// The values one attempt contributes to a progress row.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub assignment_id: String,
    pub student_id: String,
    pub score: f64,
    pub accuracy: f64,
    pub time_spent: f64,
    pub completed: bool,
    pub progress_data: Option<Value>,
}

impl From<UpdateProgressRequest> for ProgressUpdate {
    fn from(req: UpdateProgressRequest) -> Self {
        Self {
            assignment_id: req.assignment_id,
            student_id: req.student_id,
            score: req.score,
            accuracy: req.accuracy,
            time_spent: req.time_spent,
            completed: req.completed,
            progress_data: req.session_data.map(Value::Object),
        }
    }
}

/// Row written for every assigned student before they start.
pub fn initial_progress(assignment_id: &str, student_id: &str) -> Row {
    let mut row = Row::new();
    row.insert("assignment_id".into(), json!(assignment_id));
    row.insert("student_id".into(), json!(student_id));
    row.insert("status".into(), ProgressStatus::NotStarted.into());
    row.insert("best_score".into(), json!(0));
    row.insert("best_accuracy".into(), json!(0));
    row.insert("total_time_spent".into(), json!(0));
    row.insert("attempts_count".into(), json!(0));
    row
}

/// Combines the stored progress row (if any) with a new attempt.
///
/// * `best_score` and `best_accuracy` keep the running maximum.
/// * Once completed, a row stays completed and keeps its first `completed_at`.
/// * Time spent and progress data are replaced by the latest attempt.
///
/// Applying the same update twice yields the same row as applying it once.
pub fn merge_progress(existing: Option<&Row>, update: &ProgressUpdate, now: DateTime<Utc>) -> Row {
    let previous = |column: &str| {
        existing
            .and_then(|row| row.get(column))
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    };
    let was_completed = existing.is_some_and(|row| ProgressStatus::of(row) == ProgressStatus::Completed);
    let completed = was_completed || update.completed;

    let mut row = Row::new();
    row.insert("assignment_id".into(), json!(update.assignment_id));
    row.insert("student_id".into(), json!(update.student_id));
    row.insert("best_score".into(), json!(previous("best_score").max(update.score)));
    row.insert(
        "best_accuracy".into(),
        json!(previous("best_accuracy").max(update.accuracy)),
    );
    row.insert("total_time_spent".into(), json!(update.time_spent));

    let status = if completed {
        ProgressStatus::Completed
    } else {
        ProgressStatus::InProgress
    };
    row.insert("status".into(), status.into());

    if completed {
        let first_completion = existing
            .and_then(|row| row.get("completed_at"))
            .filter(|at| !at.is_null())
            .cloned()
            .unwrap_or_else(|| timestamp_value(now));
        row.insert("completed_at".into(), first_completion);
    }
    if let Some(data) = &update.progress_data {
        row.insert("progress_data".into(), data.clone());
    }
    row.insert("updated_at".into(), timestamp_value(now));
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn update(score: f64, accuracy: f64, completed: bool) -> ProgressUpdate {
        ProgressUpdate {
            assignment_id: "a1".into(),
            student_id: "s1".into(),
            score,
            accuracy,
            time_spent: 120.0,
            completed,
            progress_data: None,
        }
    }

    #[test]
    fn first_attempt_takes_its_own_values() {
        let now = Utc::now();
        let row = merge_progress(None, &update(70.0, 80.0, false), now);
        assert_eq!(row["best_score"], json!(70.0));
        assert_eq!(row["status"], json!("in_progress"));
        assert!(!row.contains_key("completed_at"));
    }

    #[test]
    fn lower_score_never_replaces_best() {
        let now = Utc::now();
        let first = merge_progress(None, &update(90.0, 95.0, false), now);
        let second = merge_progress(Some(&first), &update(40.0, 50.0, false), now);
        assert_eq!(second["best_score"], json!(90.0));
        assert_eq!(second["best_accuracy"], json!(95.0));
    }

    #[test]
    fn completion_is_sticky_and_keeps_first_timestamp() {
        let first_at = Utc::now();
        let done = merge_progress(None, &update(50.0, 60.0, true), first_at);
        let later = merge_progress(Some(&done), &update(80.0, 90.0, false), first_at + Duration::hours(2));
        assert_eq!(later["status"], json!("completed"));
        assert_eq!(later["completed_at"], done["completed_at"]);
        assert_eq!(later["best_score"], json!(80.0));
    }

    #[test]
    fn repeated_update_is_stable() {
        let now = Utc::now();
        let once = merge_progress(None, &update(60.0, 70.0, true), now);
        let twice = merge_progress(Some(&once), &update(60.0, 70.0, true), now);
        assert_eq!(once, twice);
    }

    #[test]
    fn initial_rows_start_at_zero() {
        let row = initial_progress("a1", "s9");
        assert_eq!(ProgressStatus::of(&row), ProgressStatus::NotStarted);
        assert_eq!(row["attempts_count"], json!(0));
    }
}
