use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// GET /
pub async fn root() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "public": ["/portfolio/login", "/portfolio/manage-layout", "/portfolio/user/register", "/portfolio/user/login"],
            "authenticated": ["/portfolio/*"],
            "admin": ["/portfolio/expense/user/get-all", "/portfolio/expense/user/role", "/portfolio/expense/user/delete/:id"]
        }
    }))
}

/// GET /health - reports the document store as reachable or not
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "success": true, "status": "ok" }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "success": false, "status": "unavailable", "error": "Document store unreachable" })),
            )
        }
    }
}
