// src/handlers/api.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    error::AppError,
    tools::{Dispatcher, ToolDescriptor, catalogue},
};

/// Body of a tool call.
#[derive(Debug, Deserialize)]
pub struct CallToolRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// Lists every operation with its input schema.
pub async fn list_tools() -> impl IntoResponse {
    let tools: Vec<ToolDescriptor> = catalogue().iter().map(ToolDescriptor::from).collect();
    Json(json!({ "tools": tools }))
}

/// Runs one tool call. Tool failures are reported inside the envelope with
/// a 200 status.
pub async fn call_tool(
    State(dispatcher): State<Dispatcher>,
    Json(payload): Json<CallToolRequest>,
) -> impl IntoResponse {
    let arguments = match payload.arguments {
        Value::Null => json!({}),
        other => other,
    };
    Json(dispatcher.call(&payload.name, arguments).await)
}

/// Reports whether the data store answers.
pub async fn health(State(dispatcher): State<Dispatcher>) -> Result<impl IntoResponse, AppError> {
    dispatcher.store().ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}
