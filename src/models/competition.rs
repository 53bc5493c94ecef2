// src/models/competition.rs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::choice;

choice!(CompetitionType {
    Daily => "daily",
    Weekly => "weekly",
    Monthly => "monthly",
    Special => "special",
});

choice!(ScoringMethod {
    TotalPoints => "total_points",
    BestScore => "best_score",
    AverageScore => "average_score",
    Improvement => "improvement",
});

/// DTO for creating a competition. Serializes to the `competitions` row.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateCompetitionRequest {
    #[schemars(description = "Competition title")]
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Competition description")]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub competition_type: CompetitionType,

    #[schemars(description = "Start date (ISO string)")]
    pub start_date: String,

    #[schemars(description = "End date (ISO string)")]
    pub end_date: String,

    #[schemars(description = "Allowed game types")]
    pub game_types: Vec<String>,

    pub scoring_method: ScoringMethod,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Minimum games required")]
    pub min_games_required: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Class UUID (optional for class-specific competitions)", extend("format" = "uuid"))]
    pub class_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Whether the competition is public")]
    pub is_public: Option<bool>,

    #[schemars(description = "Creator UUID", extend("format" = "uuid"))]
    pub created_by: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ActiveCompetitionsQuery {
    #[schemars(description = "Filter by class UUID", extend("format" = "uuid"))]
    pub class_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn competition(start: &str, end: &str) -> CreateCompetitionRequest {
        serde_json::from_value(json!({
            "title": "Spring Sprint",
            "type": "weekly",
            "start_date": start,
            "end_date": end,
            "game_types": ["hangman"],
            "scoring_method": "total_points",
            "created_by": "t1"
        }))
        .unwrap()
    }

    #[test]
    fn dates_are_stored_as_given() {
        let row = crate::models::to_row("competition", &competition("2025-04-08", "2025-04-01")).unwrap();
        assert_eq!(row["start_date"], json!("2025-04-08"));
        assert_eq!(row["end_date"], json!("2025-04-01"));
    }

    #[test]
    fn serializes_type_under_its_column_name() {
        let row = crate::models::to_row("competition", &competition("2025-04-01", "2025-04-08")).unwrap();
        assert_eq!(row["type"], json!("weekly"));
        assert!(!row.contains_key("class_id"));
    }
}
