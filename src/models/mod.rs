// src/models/mod.rs

pub mod aqa;
pub mod assignment;
pub mod competition;
pub mod game_session;
pub mod progress;
pub mod reading;
pub mod vocabulary;

use serde::Serialize;
use serde_json::Value;

use crate::{error::HandlerError, store::Row};

/// Table names used by the handlers.
pub mod tables {
    pub const ASSIGNMENTS: &str = "assignments";
    pub const PROGRESS: &str = "enhanced_assignment_progress";
    pub const CLASSES: &str = "classes";
    pub const STUDENT_CLASSES: &str = "student_classes";
    pub const PROFILES: &str = "user_profiles";

    pub const VOCAB_LISTS: &str = "enhanced_vocabulary_lists";
    pub const VOCAB_ITEMS: &str = "enhanced_vocabulary_items";
    pub const ASSIGNMENT_VOCAB_LISTS: &str = "vocabulary_assignment_lists";
    pub const ASSIGNMENT_VOCAB_ITEMS: &str = "vocabulary_assignment_items";
    pub const VOCABULARY: &str = "vocabulary";

    pub const GAME_SESSIONS: &str = "enhanced_game_sessions";
    pub const ACHIEVEMENTS: &str = "student_achievements";
    pub const COMPETITIONS: &str = "competitions";

    pub const AQA_ASSESSMENTS: &str = "aqa_reading_assessments";
    pub const AQA_ASSIGNMENTS: &str = "aqa_reading_assignments";
    pub const AQA_RESULTS: &str = "aqa_reading_results";
    pub const AQA_RESPONSES: &str = "aqa_reading_question_responses";

    pub const READING_TASKS: &str = "reading_comprehension_tasks";
    pub const READING_QUESTIONS: &str = "reading_comprehension_questions";
    pub const READING_RESULTS: &str = "reading_comprehension_results";
    pub const READING_QUESTION_RESULTS: &str = "reading_comprehension_question_results";
}

/// Declares a closed set of string values with its wire names.
macro_rules! choice {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, schemars::JsonSchema,
        )]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl From<$name> for serde_json::Value {
            fn from(choice: $name) -> Self {
                serde_json::Value::from(choice.as_str())
            }
        }
    };
}
pub(crate) use choice;

/// Serializes an entity into a row for the data store.
pub fn to_row<T: Serialize>(entity: &'static str, value: &T) -> Result<Row, HandlerError> {
    match serde_json::to_value(value).map_err(|e| HandlerError::Encode(entity, e))? {
        Value::Object(row) => Ok(row),
        _ => Err(HandlerError::Encode(
            entity,
            <serde_json::Error as serde::ser::Error>::custom("expected a JSON object"),
        )),
    }
}

/// Id column of a stored row as a string.
pub fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    choice!(Sample { First => "first-one", Second => "second" });

    #[test]
    fn choices_round_trip_through_wire_names() {
        assert_eq!(Sample::First.as_str(), "first-one");
        let parsed: Sample = serde_json::from_value(json!("first-one")).unwrap();
        assert_eq!(parsed, Sample::First);
        assert_eq!(Value::from(Sample::Second), json!("second"));
    }

    #[test]
    fn choices_publish_their_wire_names_as_an_enum() {
        let schema = serde_json::to_value(schemars::schema_for!(Sample)).unwrap();
        assert_eq!(schema["enum"], json!(["first-one", "second"]));
    }

    #[test]
    fn to_row_rejects_non_objects() {
        assert!(to_row("number", &5).is_err());
        let row = to_row("pair", &json!({ "a": 1 })).unwrap();
        assert_eq!(row["a"], json!(1));
    }
}
