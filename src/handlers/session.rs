// handlers/session.rs - POST /portfolio/login
//
// Site-owner login against the fixed EMAIL / PASSWORD credentials. The token
// carries the Admin role and no account id.

use axum::extract::State;

use crate::auth::Role;
use crate::database::models::LoginRequest;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

pub async fn login(State(state): State<AppState>, JsonBody(body): JsonBody<LoginRequest>) -> ApiResult {
    let Some((email, password)) = state.config.admin_credentials() else {
        tracing::warn!("Site login attempted but EMAIL/PASSWORD are not configured");
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    if body.email != email || body.password != password {
        tracing::warn!("Failed site login for {}", body.email);
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = state.tokens.issue(email, "", Role::Admin).map_err(|e| {
        tracing::error!("Failed to generate token: {}", e);
        ApiError::internal_server_error("Failed to generate token")
    })?;

    tracing::info!("Site owner logged in");
    Ok(ApiResponse::ok().with("token", token))
}
