// src/models/aqa.rs

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::choice;
use crate::{
    analytics::GroupKey,
    config::{DEFAULT_DUE_IN_DAYS, FOUNDATION_TIME_LIMIT_MINUTES, HIGHER_TIME_LIMIT_MINUTES},
    utils::{text::capitalize, time::timestamp_value},
};

/// Value of `assignments.game_type` for AQA reading assessments.
pub const AQA_GAME_TYPE: &str = "aqa_reading_assessment";

choice!(
    /// Groupings offered by AQA reading analytics.
    AqaGrouping {
        QuestionType => "question_type",
        Theme => "theme",
        Topic => "topic",
        Student => "student",
    }
);

impl AqaGrouping {
    pub fn key(self) -> GroupKey {
        match self {
            AqaGrouping::QuestionType => GroupKey::QuestionType,
            AqaGrouping::Theme => GroupKey::Theme,
            AqaGrouping::Topic => GroupKey::Topic,
            AqaGrouping::Student => GroupKey::Student,
        }
    }
}

choice!(AssessmentLevel {
    Foundation => "foundation",
    Higher => "higher",
});

impl AssessmentLevel {
    pub fn default_time_limit(self) -> u32 {
        match self {
            AssessmentLevel::Foundation => FOUNDATION_TIME_LIMIT_MINUTES,
            AssessmentLevel::Higher => HIGHER_TIME_LIMIT_MINUTES,
        }
    }

    pub fn description(self) -> String {
        format!("AQA Reading Assessment - {}", capitalize(self.as_str()))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateAqaAssignmentRequest {
    #[schemars(description = "Assignment title")]
    pub title: String,

    #[schemars(description = "Teacher UUID", extend("format" = "uuid"))]
    pub teacher_id: String,

    #[schemars(description = "Class UUID", extend("format" = "uuid"))]
    pub class_id: Option<String>,

    /// Assigns a single student instead of the whole class.
    #[schemars(description = "Student UUID for an individual assignment", extend("format" = "uuid"))]
    pub student_id: Option<String>,

    #[schemars(description = "Assessment difficulty level")]
    pub assessment_level: AssessmentLevel,

    #[schemars(description = "Due date (ISO string)")]
    pub due_date: Option<String>,

    #[schemars(description = "Custom time limit in minutes")]
    pub custom_time_limit: Option<u32>,

    #[schemars(description = "Custom instructions")]
    pub custom_instructions: Option<String>,
}

/// The `assignments` row behind an AQA assessment.
#[derive(Debug, Serialize)]
pub struct NewAqaAssignment<'a> {
    pub title: &'a str,
    pub description: String,
    pub teacher_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<&'a str>,
    pub game_type: &'static str,
    pub due_date: serde_json::Value,
    pub time_limit: u32,
}

impl<'a> NewAqaAssignment<'a> {
    /// Fills the level's time limit and a due date `DEFAULT_DUE_IN_DAYS`
    /// after `now` when the caller gave none.
    pub fn new(req: &'a CreateAqaAssignmentRequest, now: DateTime<Utc>) -> Self {
        let due_date = match &req.due_date {
            Some(due) => serde_json::Value::from(due.as_str()),
            None => timestamp_value(now + Duration::days(DEFAULT_DUE_IN_DAYS)),
        };
        Self {
            title: &req.title,
            description: req.assessment_level.description(),
            teacher_id: &req.teacher_id,
            class_id: req.class_id.as_deref(),
            game_type: AQA_GAME_TYPE,
            due_date,
            time_limit: req
                .custom_time_limit
                .unwrap_or_else(|| req.assessment_level.default_time_limit()),
        }
    }
}

/// The `aqa_reading_assignments` row linking an assignment to its assessment.
#[derive(Debug, Serialize)]
pub struct AqaAssignmentLink<'a> {
    pub assignment_id: &'a str,
    pub assessment_id: &'a str,
    pub teacher_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_id: Option<&'a str>,
    pub due_date: &'a serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_time_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<&'a str>,
}

impl<'a> AqaAssignmentLink<'a> {
    pub fn new(
        req: &'a CreateAqaAssignmentRequest,
        assignment: &'a NewAqaAssignment<'a>,
        assignment_id: &'a str,
        assessment_id: &'a str,
    ) -> Self {
        Self {
            assignment_id,
            assessment_id,
            teacher_id: &req.teacher_id,
            class_id: req.class_id.as_deref(),
            student_id: req.student_id.as_deref(),
            due_date: &assignment.due_date,
            custom_time_limit: req.custom_time_limit,
            custom_instructions: req.custom_instructions.as_deref(),
        }
    }
}

/// Filters for AQA results; `teacher_id` is mandatory, the rest narrow it.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct AqaResultsQuery {
    #[schemars(description = "Teacher UUID", extend("format" = "uuid"))]
    pub teacher_id: String,

    #[schemars(description = "Filter by class UUID", extend("format" = "uuid"))]
    pub class_id: Option<String>,

    #[schemars(description = "Filter by student UUID", extend("format" = "uuid"))]
    pub student_id: Option<String>,

    #[schemars(description = "Filter by level (optional)")]
    pub assessment_level: Option<AssessmentLevel>,

    #[schemars(description = "Results submitted from (ISO string)")]
    pub date_from: Option<String>,

    #[schemars(description = "Results submitted until (ISO string)")]
    pub date_to: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AqaAnalyticsQuery {
    #[schemars(description = "Teacher UUID", extend("format" = "uuid"))]
    pub teacher_id: String,

    #[schemars(description = "Class UUID (optional)", extend("format" = "uuid"))]
    pub class_id: Option<String>,

    #[schemars(description = "Student UUID (optional)", extend("format" = "uuid"))]
    pub student_id: Option<String>,

    #[schemars(description = "Assessment level (optional)")]
    pub assessment_level: Option<AssessmentLevel>,

    #[schemars(description = "Group analytics by category")]
    pub group_by: AqaGrouping,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(level: &str, extra: serde_json::Value) -> CreateAqaAssignmentRequest {
        let mut args = json!({ "title": "Mock", "teacher_id": "t1", "assessment_level": level });
        if let (Some(args), Some(extra)) = (args.as_object_mut(), extra.as_object()) {
            args.extend(extra.clone());
        }
        serde_json::from_value(args).unwrap()
    }

    #[test]
    fn defaults_follow_the_level() {
        let now = Utc::now();
        let foundation = request("foundation", json!({}));
        let row = NewAqaAssignment::new(&foundation, now);
        assert_eq!(row.time_limit, 45);
        assert_eq!(row.description, "AQA Reading Assessment - Foundation");
        assert_eq!(row.due_date, timestamp_value(now + Duration::days(7)));

        let higher = request("higher", json!({}));
        assert_eq!(NewAqaAssignment::new(&higher, now).time_limit, 60);
    }

    #[test]
    fn caller_values_win_over_defaults() {
        let req = request("higher", json!({ "custom_time_limit": 30, "due_date": "2025-06-01" }));
        let row = NewAqaAssignment::new(&req, Utc::now());
        assert_eq!(row.time_limit, 30);
        assert_eq!(row.due_date, json!("2025-06-01"));
    }

    #[test]
    fn groupings_map_onto_breakdown_keys() {
        let query: AqaAnalyticsQuery =
            serde_json::from_value(json!({ "teacher_id": "t1", "group_by": "theme" })).unwrap();
        assert_eq!(query.group_by.key(), GroupKey::Theme);
        assert!(
            serde_json::from_value::<AqaAnalyticsQuery>(json!({ "teacher_id": "t1", "group_by": "language" }))
                .is_err()
        );
    }
}
