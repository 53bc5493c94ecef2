// src/tools/dispatcher.rs

use std::sync::Arc;

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::Value;

use super::{Operation, ToolRequest};
use crate::{
    error::{HandlerError, ToolError},
    handlers,
    store::DataStore,
};

/// The single outcome of one tool call.
#[derive(Debug)]
pub enum ToolOutcome {
    Success(Value),
    Failure { operation: String, error: ToolError },
}

impl ToolOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success(_))
    }

    /// Message carried by a failure, prefixed with the operation name.
    pub fn error_message(&self) -> Option<String> {
        match self {
            ToolOutcome::Success(_) => None,
            ToolOutcome::Failure { operation, error } => {
                Some(format!("Error executing {}: {}", operation, error))
            }
        }
    }
}

/// `{"success": true, "payload": ..}` or
/// `{"success": false, "error": "Error executing <name>: ..", "kind": ..}`.
impl Serialize for ToolOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ToolOutcome::Success(payload) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("payload", payload)?;
                map.end()
            }
            ToolOutcome::Failure { error, .. } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", &self.error_message())?;
                map.serialize_entry("kind", error.kind())?;
                map.end()
            }
        }
    }
}

/// Routes tool calls to their handlers over a shared data store.
#[derive(Clone)]
pub struct Dispatcher {
    store: Arc<dyn DataStore>,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DataStore> {
        &self.store
    }

    /// Resolves, validates and runs one call. Never fails: every error is
    /// folded into the returned outcome.
    pub async fn call(&self, name: &str, arguments: Value) -> ToolOutcome {
        match self.try_call(name, arguments).await {
            Ok(payload) => {
                tracing::info!("Tool {} succeeded", name);
                ToolOutcome::Success(payload)
            }
            Err(error) => {
                match &error {
                    ToolError::Handler(e) => tracing::error!("Tool {} failed: {}", name, e),
                    other => tracing::warn!("Tool {} rejected: {}", name, other),
                }
                ToolOutcome::Failure {
                    operation: name.to_string(),
                    error,
                }
            }
        }
    }

    async fn try_call(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let operation =
            Operation::from_name(name).ok_or_else(|| ToolError::UnknownOperation(name.to_string()))?;
        let request = ToolRequest::parse(operation, arguments)?;

        tracing::debug!("Dispatching {}", operation.name());
        let store = Arc::clone(&self.store);
        let payload = tokio::spawn(async move { handlers::run(store.as_ref(), request).await })
            .await
            .map_err(|e| HandlerError::Crashed(e.to_string()))??;
        Ok(payload)
    }
}
