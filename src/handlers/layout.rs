// handlers/layout.rs - /portfolio/manage-layout?type=<kind>
//
// One document per layout kind; POST creates or overwrites it. The kind is resolved from the query string
// before the body is touched, so an unknown kind never reads or writes.

use axum::{
    body::to_bytes,
    extract::{Request, State},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::{Layout, LayoutFields, LayoutKind, LayoutPayload, LAYOUTS};
use crate::database::{Record, Update};
use crate::error::{ApiError, StoreResultExt};
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult, QueryParams};
use crate::state::AppState;

const MAX_LAYOUT_BODY: usize = 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct LayoutQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl LayoutQuery {
    fn kind(&self) -> Result<LayoutKind, ApiError> {
        self.kind
            .as_deref()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| ApiError::bad_request("Invalid layout type"))
    }
}

fn by_kind(kind: LayoutKind) -> Filter {
    Filter::new().eq("type", kind.as_str())
}

async fn read_payload(kind: LayoutKind, request: Request) -> Result<LayoutPayload, ApiError> {
    let bytes = to_bytes(request.into_body(), MAX_LAYOUT_BODY)
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read request body: {}", e)))?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|e| ApiError::bad_request(e.to_string()))?;
    LayoutPayload::decode(kind, value).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// GET - public
pub async fn get_layout(State(state): State<AppState>, QueryParams(query): QueryParams<LayoutQuery>) -> ApiResult {
    let kind = query.kind()?;

    let layout = state
        .repo::<Layout>(LAYOUTS)
        .select_one(by_kind(kind))
        .await
        .or_internal(&format!("Error retrieving {}", kind))?
        .ok_or_else(|| ApiError::not_found(format!("{} not found", kind)))?;

    Ok(ApiResponse::ok().with("layout", layout))
}

/// Overwrite every editable field of `data`; `view_count` is left alone.
async fn overwrite(state: &AppState, kind: LayoutKind, payload: &LayoutPayload) -> Result<u64, ApiError> {
    let fields = payload.editable_fields().map_err(|e| {
        tracing::error!("Failed to encode {} payload: {}", kind, e);
        ApiError::internal_server_error("Error updating layout")
    })?;

    let update = fields
        .into_iter()
        .fold(Update::stamped(Utc::now()), |update, (field, value)| {
            update.set(&format!("data.{}", field), value)
        });

    let result = state
        .repo::<Layout>(LAYOUTS)
        .update_one(by_kind(kind), update)
        .await
        .or_internal("Error updating layout")?;
    Ok(result.matched)
}

/// POST - upsert by kind. An existing document is overwritten like PUT.
pub async fn create_layout(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LayoutQuery>,
    request: Request,
) -> ApiResult {
    let kind = query.kind()?;
    let payload = read_payload(kind, request).await?;

    let repo = state.repo::<Layout>(LAYOUTS);
    let existing = repo
        .count(by_kind(kind))
        .await
        .or_internal("Error creating layout")?;
    if existing > 0 && overwrite(&state, kind, &payload).await? > 0 {
        tracing::info!("Overwrote existing layout {}", kind);
        return Ok(ApiResponse::created().message(format!("{} created successfully", kind)));
    }

    let data = serde_json::to_value(payload.for_create()).map_err(|e| {
        tracing::error!("Failed to encode {} payload: {}", kind, e);
        ApiError::internal_server_error("Error creating layout")
    })?;

    let layout = Record::new(LayoutFields { kind, data }, Utc::now());
    repo.insert(&layout).await.or_internal("Error creating layout")?;

    tracing::info!("Created layout {}", kind);
    Ok(ApiResponse::created().message(format!("{} created successfully", kind)))
}

/// PUT - replaces every editable field of `data`.
pub async fn update_layout(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LayoutQuery>,
    request: Request,
) -> ApiResult {
    let kind = query.kind()?;
    let payload = read_payload(kind, request).await?;

    if overwrite(&state, kind, &payload).await? == 0 {
        return Err(ApiError::not_found(format!("{} not found", kind)));
    }

    Ok(ApiResponse::ok().message(format!("{} updated successfully", kind)))
}
