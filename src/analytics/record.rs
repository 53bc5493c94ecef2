// src/analytics/record.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{store::Row, utils::time::parse_timestamp};

/// Per-dimension performance inside one attempt, as stored in the
/// `performance_by_*` columns: `{total, correct, averageTimeSeconds, scorePercentage}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakdown {
    pub total: u64,
    pub correct: u64,
    pub average_time_seconds: f64,
    pub score_percentage: f64,
}

impl Breakdown {
    /// Reads a breakdown entry; missing or non-numeric members count as zero.
    pub fn from_value(value: &Value) -> Option<Self> {
        let entry = value.as_object()?;
        Some(Self {
            total: count(entry.get("total")),
            correct: count(entry.get("correct")),
            average_time_seconds: number(entry.get("averageTimeSeconds")),
            score_percentage: number(entry.get("scorePercentage")),
        })
    }
}

/// One completed attempt at an assessment or reading task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRecord {
    pub student_id: String,
    pub student_name: Option<String>,
    pub task_id: Option<String>,
    pub score: f64,
    pub total_questions: u64,
    pub correct_answers: u64,
    pub time_seconds: f64,
    pub passed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub difficulty: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
    pub by_question_type: BTreeMap<String, Breakdown>,
    pub by_theme: BTreeMap<String, Breakdown>,
    pub by_topic: BTreeMap<String, Breakdown>,
}

impl ResultRecord {
    /// Builds a record from a `reading_comprehension_results` row with its
    /// `task` and `student` relations embedded.
    pub fn from_reading_row(row: &Row) -> Self {
        let task = row.get("task").and_then(Value::as_object);
        let task_field = |name: &str| task.and_then(|t| text(t.get(name)));

        Self {
            student_id: text(row.get("student_id")).unwrap_or_default(),
            student_name: row.get("student").and_then(display_name),
            task_id: text(row.get("task_id")),
            score: number(row.get("score_percentage")),
            total_questions: count(row.get("total_questions")),
            correct_answers: count(row.get("correct_answers")),
            time_seconds: number(row.get("time_spent_seconds")),
            passed: row.get("passed").and_then(Value::as_bool).unwrap_or(false),
            completed_at: timestamp(row.get("completed_at")),
            difficulty: task_field("difficulty"),
            category: task_field("category"),
            language: task_field("language"),
            ..Self::default()
        }
    }

    /// Builds a record from an `aqa_reading_results` row with its `student`
    /// relation embedded.
    pub fn from_aqa_row(row: &Row) -> Self {
        let assessment = row
            .get("assignment")
            .and_then(|a| a.get("assessment"))
            .and_then(Value::as_object);

        Self {
            student_id: text(row.get("student_id")).unwrap_or_default(),
            student_name: row.get("student").and_then(display_name),
            task_id: text(row.get("assignment_id")),
            score: number(row.get("percentage_score")),
            total_questions: count(row.get("total_questions")),
            correct_answers: count(row.get("correct_answers")),
            time_seconds: number(row.get("total_time_seconds")),
            passed: row.get("passed").and_then(Value::as_bool).unwrap_or(false),
            completed_at: timestamp(row.get("submission_date")),
            difficulty: assessment.and_then(|a| text(a.get("level"))),
            by_question_type: breakdowns(row.get("performance_by_question_type")),
            by_theme: breakdowns(row.get("performance_by_theme")),
            by_topic: breakdowns(row.get("performance_by_topic")),
            ..Self::default()
        }
    }
}

/// `display_name`, else "first last", else nothing.
fn display_name(profile: &Value) -> Option<String> {
    if let Some(name) = text(profile.get("display_name")).filter(|n| !n.trim().is_empty()) {
        return Some(name);
    }
    let first = text(profile.get("first_name")).unwrap_or_default();
    let last = text(profile.get("last_name")).unwrap_or_default();
    let full = format!("{} {}", first, last).trim().to_string();
    (!full.is_empty()).then_some(full)
}

fn breakdowns(value: Option<&Value>) -> BTreeMap<String, Breakdown> {
    value
        .and_then(Value::as_object)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(name, v)| Breakdown::from_value(v).map(|b| (name.clone(), b)))
                .collect()
        })
        .unwrap_or_default()
}

fn text(value: Option<&Value>) -> Option<String> {
    value.and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn number(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn count(value: Option<&Value>) -> u64 {
    let n = number(value);
    if n > 0.0 { n.round() as u64 } else { 0 }
}

pub(crate) fn timestamp(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value.and_then(Value::as_str).and_then(parse_timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn reads_reading_result_with_embedded_task() {
        let record = ResultRecord::from_reading_row(&row(json!({
            "student_id": "s1",
            "task_id": "t1",
            "score_percentage": 75,
            "total_questions": 8,
            "correct_answers": 6,
            "time_spent_seconds": 310.5,
            "passed": true,
            "completed_at": "2025-05-01T09:00:00Z",
            "task": { "difficulty": "foundation", "category": "travel", "language": "spanish" },
            "student": { "first_name": "Ana", "last_name": "Ruiz" }
        })));
        assert_eq!(record.score, 75.0);
        assert_eq!(record.correct_answers, 6);
        assert_eq!(record.difficulty.as_deref(), Some("foundation"));
        assert_eq!(record.student_name.as_deref(), Some("Ana Ruiz"));
        assert!(record.completed_at.is_some());
    }

    #[test]
    fn reads_aqa_breakdowns_and_skips_malformed_entries() {
        let record = ResultRecord::from_aqa_row(&row(json!({
            "student_id": "s1",
            "percentage_score": 64,
            "performance_by_theme": {
                "Theme 1": { "total": 5, "correct": 3, "averageTimeSeconds": 40, "scorePercentage": 60 },
                "Theme 2": "garbage"
            },
            "student": { "display_name": "Sam" }
        })));
        assert_eq!(record.by_theme.len(), 1);
        assert_eq!(record.by_theme["Theme 1"].correct, 3);
        assert!(record.by_topic.is_empty());
        assert_eq!(record.student_name.as_deref(), Some("Sam"));
    }

    #[test]
    fn missing_numbers_default_to_zero() {
        let record = ResultRecord::from_reading_row(&row(json!({ "student_id": "s1", "passed": "yes" })));
        assert_eq!(record.score, 0.0);
        assert_eq!(record.total_questions, 0);
        assert!(!record.passed);
        assert_eq!(record.student_name, None);
    }
}
