// tests/api_tests.rs

use std::sync::Arc;

use gems_tools::{
    config::Config, models::tables::STUDENT_CLASSES, routes, state::AppState, store::MemoryStore,
    tools::Dispatcher,
};
use serde_json::{Value, json};

/// Spawns the app on a random port over an in-memory store.
/// Returns the base URL (e.g., "http://127.0.0.1:12345") and the store.
async fn spawn_app() -> (String, Arc<MemoryStore>) {
    // 1. Create the store and test configuration
    let store = Arc::new(MemoryStore::new());
    let config = Config {
        database_url: "postgres://localhost/gems_test".to_string(),
        database_key: "test_key".to_string(),
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        max_connections: 1,
        log_dir: "logs".to_string(),
    };

    let state = AppState {
        dispatcher: Dispatcher::new(store.clone()),
        config,
    };

    // 2. Create the router with the app state
    let app = routes::create_router(state);

    // 3. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 4. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, store)
}

#[tokio::test]
async fn unknown_path_is_404() {
    // Arrange
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn health_reports_ok() {
    // Arrange
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/api/health", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn discovery_lists_every_tool_with_schema() {
    // Arrange
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(&format!("{}/api/tools", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    let tools = body["tools"].as_array().expect("tools array");
    assert_eq!(tools.len(), 21);

    let create = tools
        .iter()
        .find(|t| t["name"] == "create_assignment")
        .expect("create_assignment listed");
    assert_eq!(create["inputSchema"]["type"], "object");
    let required = create["inputSchema"]["required"].as_array().unwrap();
    assert!(required.contains(&json!("teacher_id")));
    assert!(required.contains(&json!("vocabulary_selection")));
}

#[tokio::test]
async fn call_runs_the_tool_and_wraps_the_payload() {
    // Arrange
    let (address, store) = spawn_app().await;
    let client = reqwest::Client::new();
    let class_id = "0d3c1c7e-3f4b-4f7a-8d0f-2a9b7c6d5e4f";
    store.seed(
        STUDENT_CLASSES,
        [json!({ "class_id": class_id, "student_id": "a1111111-1111-4111-8111-111111111111" })],
    );

    // Act
    let response = client
        .post(&format!("{}/api/tools/call", address))
        .json(&json!({
            "name": "create_assignment",
            "arguments": {
                "title": "Colours",
                "teacher_id": "7f1c6a64-5d0e-4c55-9b7e-0f5f1f6f2a11",
                "class_id": class_id,
                "game_type": "memory-game",
                "vocabulary_selection": { "type": "random", "count": 10 },
                "game_settings": {}
            }
        }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["payload"]["students_assigned"], 1);
    assert_eq!(body["payload"]["assignment"]["title"], "Colours");
}

#[tokio::test]
async fn failed_call_is_still_200_with_error_envelope() {
    // Arrange
    let (address, store) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .post(&format!("{}/api/tools/call", address))
        .json(&json!({ "name": "format_disk" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Error executing format_disk: Unknown tool: format_disk");
    assert_eq!(store.write_count(), 0);
}

#[tokio::test]
async fn call_without_arguments_validates_an_empty_object() {
    // Arrange
    let (address, _) = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .post(&format!("{}/api/tools/call", address))
        .json(&json!({ "name": "get_student_analytics" }))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "invalid_arguments");
    assert!(body["error"].as_str().unwrap().contains("student_id"));
}
