// src/models/assignment.rs

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::choice;

choice!(
    /// How words are picked from the vocabulary list.
    SelectionType {
        All => "all",
        Random => "random",
        Manual => "manual",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VocabularySelection {
    #[serde(rename = "type")]
    pub kind: SelectionType,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Number of words for random selection")]
    pub count: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(
        description = "Specific word IDs for manual selection",
        extend("items" = { "type": "string", "format": "uuid" })
    )]
    pub word_ids: Option<Vec<String>>,
}

/// DTO for creating a game assignment. Serializes to the `assignments` row.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateAssignmentRequest {
    #[schemars(description = "Assignment title")]
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Assignment description")]
    pub description: Option<String>,

    #[schemars(description = "Teacher UUID", extend("format" = "uuid"))]
    pub teacher_id: String,

    #[schemars(description = "Class UUID", extend("format" = "uuid"))]
    pub class_id: String,

    #[schemars(description = "Type of game for the assignment")]
    pub game_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Vocabulary list UUID", extend("format" = "uuid"))]
    pub vocabulary_list_id: Option<String>,

    #[schemars(description = "Vocabulary selection configuration")]
    pub vocabulary_selection: VocabularySelection,

    #[schemars(description = "Game-specific settings")]
    pub game_settings: Map<String, Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Due date (ISO string)")]
    pub due_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Time limit in minutes")]
    pub time_limit: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetAssignmentRequest {
    #[schemars(description = "Assignment UUID", extend("format" = "uuid"))]
    pub assignment_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct AssignmentAnalyticsRequest {
    #[schemars(description = "Assignment UUID", extend("format" = "uuid"))]
    pub assignment_id: String,
}
