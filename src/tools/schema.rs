// src/tools/schema.rs

//! Input schemas derived from the request types.
//!
//! Each operation's JSON Schema is generated with `schemars` from the same
//! struct the arguments decode into, and incoming arguments are checked
//! against it with `jsonschema` before anything touches the data store.

use std::fmt;

use schemars::JsonSchema;
use serde_json::Value;

/// The published schema of one operation together with its compiled validator.
pub struct InputSchema {
    document: Value,
    validator: Result<jsonschema::Validator, String>,
}

impl InputSchema {
    pub fn of<T: JsonSchema>() -> Self {
        let document = serde_json::to_value(schemars::schema_for!(T)).unwrap_or_else(|e| {
            tracing::error!("Failed to render schema for {}: {}", T::schema_name(), e);
            Value::Bool(false)
        });
        let validator = jsonschema::options()
            .should_validate_formats(true)
            .build(&document)
            .map_err(|e| {
                tracing::error!("Schema for {} does not compile: {}", T::schema_name(), e);
                e.to_string()
            });
        Self { document, validator }
    }

    /// The JSON Schema advertised to callers.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Checks `arguments` against the schema, reporting the first violation.
    pub fn validate(&self, arguments: &Value) -> Result<(), ValidationError> {
        let validator = self.validator.as_ref().map_err(|reason| ValidationError {
            path: String::new(),
            message: format!("schema unavailable: {}", reason),
        })?;
        match validator.iter_errors(arguments).next() {
            Some(error) => Err(ValidationError {
                path: dotted(&error.instance_path.to_string()),
                message: error.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for InputSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputSchema")
            .field("document", &self.document)
            .field("compiled", &self.validator.is_ok())
            .finish()
    }
}

/// Turns a JSON pointer such as `/items/2/term` into `items[2].term`.
fn dotted(pointer: &str) -> String {
    let mut rendered = String::new();
    for segment in pointer.split('/').skip(1) {
        let segment = segment.replace("~1", "/").replace("~0", "~");
        if segment.parse::<usize>().is_ok() {
            rendered.push_str(&format!("[{}]", segment));
        } else {
            if !rendered.is_empty() {
                rendered.push('.');
            }
            rendered.push_str(&segment);
        }
    }
    rendered
}

/// The first field that failed validation and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending value, e.g. `items[2].term`; empty for
    /// the root (including a missing top-level field, which the message names).
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "`{}`: {}", self.path, self.message)
        }
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, JsonSchema)]
    #[serde(rename_all = "snake_case")]
    #[allow(dead_code)]
    enum Level {
        Beginner,
        Intermediate,
        Advanced,
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Item {
        term: String,
        difficulty_level: Level,
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct List {
        name: String,
        #[schemars(extend("format" = "uuid"))]
        teacher_id: String,
        limit: Option<u32>,
        items: Vec<Item>,
    }

    fn valid() -> Value {
        json!({
            "name": "Food",
            "teacher_id": "6f1c2a52-8d4b-4a55-9a5c-3b0f8f2d9e11",
            "items": [{ "term": "pan", "difficulty_level": "beginner" }]
        })
    }

    #[test]
    fn accepts_conforming_input() {
        assert_eq!(InputSchema::of::<List>().validate(&valid()), Ok(()));
    }

    #[test]
    fn missing_required_field_is_named() {
        let mut input = valid();
        input.as_object_mut().unwrap().remove("name");
        let err = InputSchema::of::<List>().validate(&input).unwrap_err();
        assert!(err.to_string().contains("\"name\""), "{}", err);
    }

    #[test]
    fn null_is_accepted_for_optional_fields_only() {
        let schema = InputSchema::of::<List>();
        let mut input = valid();
        input["limit"] = Value::Null;
        assert!(schema.validate(&input).is_ok());

        input["name"] = Value::Null;
        assert_eq!(schema.validate(&input).unwrap_err().path, "name");
    }

    #[test]
    fn nested_enum_violation_carries_the_index() {
        let mut input = valid();
        input["items"][0]["difficulty_level"] = json!("expert");
        let err = InputSchema::of::<List>().validate(&input).unwrap_err();
        assert_eq!(err.path, "items[0].difficulty_level");
        assert!(err.to_string().starts_with("`items[0].difficulty_level`: "), "{}", err);
        assert!(err.message.contains("expert"), "{}", err);
    }

    #[test]
    fn wrong_primitive_type_is_rejected() {
        let mut input = valid();
        input["limit"] = json!("ten");
        assert_eq!(InputSchema::of::<List>().validate(&input).unwrap_err().path, "limit");
    }

    #[test]
    fn rejects_fractional_integers_and_bad_uuids() {
        let schema = InputSchema::of::<List>();
        let mut input = valid();
        input["limit"] = json!(2.5);
        assert!(schema.validate(&input).is_err());

        let mut input = valid();
        input["teacher_id"] = json!("teacher-1");
        let err = schema.validate(&input).unwrap_err();
        assert_eq!(err.path, "teacher_id");
        assert!(err.message.contains("uuid"), "{}", err);
    }

    #[test]
    fn root_must_be_an_object() {
        let err = InputSchema::of::<List>().validate(&json!([])).unwrap_err();
        assert_eq!(err.path, "");
        assert!(err.message.contains("object"), "{}", err);
    }

    #[test]
    fn published_document_lists_required_fields() {
        let schema = InputSchema::of::<List>();
        let document = schema.document();
        assert_eq!(document["type"], "object");
        let required = document["required"].as_array().unwrap();
        assert_eq!(required.len(), 3);
        for field in ["name", "teacher_id", "items"] {
            assert!(required.contains(&json!(field)), "{}", field);
        }
        assert_eq!(document["properties"]["teacher_id"]["format"], "uuid");
    }

    #[test]
    fn pointers_render_as_dotted_paths() {
        assert_eq!(dotted(""), "");
        assert_eq!(dotted("/items/2/term"), "items[2].term");
        assert_eq!(dotted("/a~1b"), "a/b");
    }
}
