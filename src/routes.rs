// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handlers::api, state::AppState};

/// Assembles the application router.
///
/// * Tool discovery and invocation under `/api/tools`.
/// * Store liveness under `/api/health`.
/// * Global middleware (Trace, CORS) wraps every route.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let tool_routes = Router::new()
        .route("/", get(api::list_tools))
        .route("/call", post(api::call_tool));

    Router::new()
        .nest("/api/tools", tool_routes)
        .route("/api/health", get(api::health))
        // Global Middleware (applied from top to bottom)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
