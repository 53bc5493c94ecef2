// src/analytics/mod.rs

//! Pure aggregation over result and session records.
//!
//! Nothing here touches the data store; summaries are rebuilt from the
//! records on every call.

pub mod record;
pub mod session;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use record::{Breakdown, ResultRecord};

/// Group value used when a record lacks the grouping field.
pub const UNKNOWN_GROUP: &str = "unknown";

/// Dimension used to partition result records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Student,
    Difficulty,
    Category,
    Language,
    QuestionType,
    Theme,
    Topic,
}

impl GroupKey {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupKey::Student => "student",
            GroupKey::Difficulty => "difficulty",
            GroupKey::Category => "category",
            GroupKey::Language => "language",
            GroupKey::QuestionType => "question_type",
            GroupKey::Theme => "theme",
            GroupKey::Topic => "topic",
        }
    }

    /// Nested keys read a record's breakdown map instead of a single field,
    /// so one record can feed several groups.
    pub fn is_nested(self) -> bool {
        matches!(self, GroupKey::QuestionType | GroupKey::Theme | GroupKey::Topic)
    }
}

/// Statistics for one group value. Averages and rates are derived from the
/// totals of the same summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub total_attempts: u64,
    pub total_questions: u64,
    pub total_correct: u64,
    pub total_time_seconds: f64,
    pub passed_count: u64,
    pub best_score: f64,
    pub average_score: f64,
    pub accuracy_percentage: f64,
    pub pass_rate: f64,
    pub average_time_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_attempt: Option<DateTime<Utc>>,
}

/// One record's input to one group.
struct Contribution<'a> {
    group: &'a str,
    score: f64,
    questions: u64,
    correct: u64,
    time_seconds: f64,
    /// Attempts for direct keys, questions for nested keys.
    time_units: f64,
}

#[derive(Default)]
struct Totals {
    label: Option<String>,
    attempts: u64,
    questions: u64,
    correct: u64,
    time_seconds: f64,
    time_units: f64,
    passed: u64,
    best: f64,
    score_sum: f64,
    latest: Option<DateTime<Utc>>,
}

impl Totals {
    fn add(&mut self, record: &ResultRecord, part: &Contribution<'_>) {
        self.attempts += 1;
        self.questions += part.questions;
        self.correct += part.correct;
        self.time_seconds += part.time_seconds;
        self.time_units += part.time_units;
        self.best = self.best.max(part.score);
        self.score_sum += part.score;
        if record.passed {
            self.passed += 1;
        }
        if self.label.is_none() {
            self.label = record.student_name.clone();
        }
        if record.completed_at > self.latest {
            self.latest = record.completed_at;
        }
    }

    fn finish(self, keep_label: bool) -> GroupSummary {
        GroupSummary {
            label: if keep_label { self.label } else { None },
            total_attempts: self.attempts,
            total_questions: self.questions,
            total_correct: self.correct,
            total_time_seconds: self.time_seconds,
            passed_count: self.passed,
            best_score: self.best,
            average_score: ratio(self.score_sum, self.attempts as f64),
            accuracy_percentage: ratio(self.correct as f64, self.questions as f64) * 100.0,
            pass_rate: ratio(self.passed as f64, self.attempts as f64) * 100.0,
            average_time_seconds: ratio(self.time_seconds, self.time_units),
            latest_attempt: self.latest,
        }
    }
}

/// `numerator / denominator`, or 0 when the denominator is 0.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn direct<'a>(record: &'a ResultRecord, group: Option<&'a str>) -> Vec<Contribution<'a>> {
    vec![Contribution {
        group: group.unwrap_or(UNKNOWN_GROUP),
        score: record.score,
        questions: record.total_questions,
        correct: record.correct_answers,
        time_seconds: record.time_seconds,
        time_units: 1.0,
    }]
}

fn nested(map: &BTreeMap<String, Breakdown>) -> Vec<Contribution<'_>> {
    map.iter()
        .map(|(name, part)| Contribution {
            group: name.as_str(),
            score: part.score_percentage,
            questions: part.total,
            correct: part.correct,
            time_seconds: part.average_time_seconds * part.total as f64,
            time_units: part.total as f64,
        })
        .collect()
}

fn contributions(record: &ResultRecord, key: GroupKey) -> Vec<Contribution<'_>> {
    match key {
        GroupKey::Student => direct(
            record,
            Some(record.student_id.as_str()).filter(|id| !id.is_empty()),
        ),
        GroupKey::Difficulty => direct(record, record.difficulty.as_deref()),
        GroupKey::Category => direct(record, record.category.as_deref()),
        GroupKey::Language => direct(record, record.language.as_deref()),
        GroupKey::QuestionType => nested(&record.by_question_type),
        GroupKey::Theme => nested(&record.by_theme),
        GroupKey::Topic => nested(&record.by_topic),
    }
}

/// Partitions `records` by `key` and summarises each group.
///
/// Every group present in the input appears exactly once; an empty input
/// yields an empty map.
pub fn aggregate(records: &[ResultRecord], key: GroupKey) -> BTreeMap<String, GroupSummary> {
    let mut groups: BTreeMap<String, Totals> = BTreeMap::new();
    for record in records {
        for part in contributions(record, key) {
            groups
                .entry(part.group.to_string())
                .or_default()
                .add(record, &part);
        }
    }
    let keep_label = key == GroupKey::Student;
    groups
        .into_iter()
        .map(|(group, totals)| (group, totals.finish(keep_label)))
        .collect()
}
