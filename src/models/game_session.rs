// src/models/game_session.rs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::choice;
use crate::utils::time::TimePeriod;

choice!(SessionMode {
    Assignment => "assignment",
    FreePlay => "free_play",
});

/// DTO for opening a session. Serializes to the `enhanced_game_sessions` row
/// (the handler adds `started_at`).
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct StartGameSessionRequest {
    #[schemars(description = "Student UUID", extend("format" = "uuid"))]
    pub student_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Assignment UUID (if in assignment mode)", extend("format" = "uuid"))]
    pub assignment_id: Option<String>,

    #[schemars(description = "Type of game")]
    pub game_type: String,

    pub session_mode: SessionMode,

    #[schemars(description = "Maximum possible score")]
    pub max_score_possible: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Additional session data")]
    pub session_data: Option<Map<String, Value>>,
}

/// DTO for closing a session with its results. Serializes to the update
/// applied to the session row (the handler adds `ended_at`).
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct EndGameSessionRequest {
    #[serde(skip_serializing)]
    #[schemars(description = "Game session UUID", extend("format" = "uuid"))]
    pub session_id: String,

    #[serde(skip_serializing)]
    #[schemars(description = "Student UUID", extend("format" = "uuid"))]
    pub student_id: String,

    #[schemars(description = "Final score achieved")]
    pub final_score: f64,

    #[schemars(description = "Accuracy percentage")]
    pub accuracy_percentage: f64,

    #[schemars(description = "Completion percentage")]
    pub completion_percentage: f64,

    #[schemars(description = "Number of words attempted")]
    pub words_attempted: u32,

    #[schemars(description = "Number of words correct")]
    pub words_correct: u32,

    #[schemars(description = "Number of unique words practiced")]
    pub unique_words_practiced: u32,

    #[schemars(description = "Session duration in seconds")]
    pub duration_seconds: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Additional session data")]
    pub session_data: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct LeaderboardRequest {
    #[schemars(description = "Filter by class UUID", extend("format" = "uuid"))]
    pub class_id: Option<String>,

    #[serde(default)]
    pub time_period: TimePeriod,

    #[schemars(description = "Maximum number of entries")]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct StudentAnalyticsRequest {
    #[schemars(description = "Student UUID", extend("format" = "uuid"))]
    pub student_id: String,

    #[serde(default)]
    pub time_period: TimePeriod,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClassAnalyticsRequest {
    #[schemars(description = "Class UUID", extend("format" = "uuid"))]
    pub class_id: String,

    #[serde(default)]
    pub time_period: TimePeriod,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn start_row_leaves_out_a_missing_assignment() {
        let req: StartGameSessionRequest = serde_json::from_value(json!({
            "student_id": "s1",
            "game_type": "hangman",
            "session_mode": "assignment",
            "max_score_possible": 100
        }))
        .unwrap();
        let row = crate::models::to_row("session", &req).unwrap();
        assert!(!row.contains_key("assignment_id"));
        assert_eq!(row["session_mode"], json!("assignment"));
    }

    #[test]
    fn end_patch_excludes_identity_columns() {
        let req: EndGameSessionRequest = serde_json::from_value(json!({
            "session_id": "x", "student_id": "s1", "final_score": 120,
            "accuracy_percentage": 80, "completion_percentage": 100,
            "words_attempted": 10, "words_correct": 8, "unique_words_practiced": 9,
            "duration_seconds": 300
        }))
        .unwrap();
        let row = crate::models::to_row("session", &req).unwrap();
        assert!(!row.contains_key("session_id"));
        assert!(!row.contains_key("student_id"));
        assert_eq!(row["words_correct"], json!(8));
    }

    #[test]
    fn time_period_defaults_to_all_time() {
        let req: StudentAnalyticsRequest = serde_json::from_value(json!({ "student_id": "s1" })).unwrap();
        assert_eq!(req.time_period, TimePeriod::AllTime);
    }
}
