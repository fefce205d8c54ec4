// handlers/resource.rs - Shared CRUD for the unowned portfolio collections
//
// Certificates, services, projects, contact messages and visitor logs all
// follow the same create / update / delete / get-all / get-one shape and only
// differ in collection, field set and response keys.

use axum::extract::{Path, State};
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};

use crate::database::{PatchError, Record, Update};
use crate::error::{ApiError, StoreResultExt};
use crate::filter::Filter;
use crate::middleware::{parse_object_id, ApiResponse, ApiResult, JsonBody};
use crate::state::AppState;

pub trait Resource: Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Lower-case singular, used in messages: "Invalid certificate ID"
    const LABEL: &'static str;
    /// Capitalised singular: "Certificate not found"
    const TITLE: &'static str;
    /// Lower-case plural: "Error retrieving certificates"
    const PLURAL: &'static str;
    const LIST_KEY: &'static str;
    const ITEM_KEY: &'static str;

    type Fields: Serialize + DeserializeOwned + Send + Sync + 'static;
    type Patch: DeserializeOwned + Send + 'static;

    fn apply(patch: &Self::Patch, update: Update) -> Result<Update, PatchError>;
}

/// For collections that are never updated through the API.
#[derive(Debug, serde::Deserialize)]
pub struct NoPatch {}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    JsonBody(fields): JsonBody<R::Fields>,
) -> ApiResult {
    insert::<R>(&state, fields).await?;
    Ok(ApiResponse::created().message(format!("{} created successfully", R::TITLE)))
}

pub(crate) async fn insert<R: Resource>(state: &AppState, fields: R::Fields) -> Result<Record<R::Fields>, ApiError> {
    let record = Record::new(fields, Utc::now());
    state
        .repo::<Record<R::Fields>>(R::COLLECTION)
        .insert(&record)
        .await
        .or_internal(&format!("Error creating {}", R::LABEL))?;

    tracing::info!("Created {} {}", R::LABEL, record.id);
    Ok(record)
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<R::Patch>,
) -> ApiResult {
    let id = parse_object_id(&id, R::LABEL)?;
    let update = R::apply(&patch, Update::stamped(Utc::now()))?;

    let result = state
        .repo::<Record<R::Fields>>(R::COLLECTION)
        .update_one(Filter::by_id(id), update)
        .await
        .map_err(|err| {
            tracing::error!("Error updating {} {}: {}", R::LABEL, id, err);
            ApiError::internal_with_details(format!("Error updating {}", R::LABEL), err.to_string())
        })?;

    if result.matched == 0 {
        return Err(ApiError::not_found(format!("{} not found", R::TITLE)));
    }

    Ok(ApiResponse::ok().message(format!("{} updated successfully", R::TITLE)))
}

pub async fn delete<R: Resource>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = parse_object_id(&id, R::LABEL)?;

    let result = state
        .repo::<Record<R::Fields>>(R::COLLECTION)
        .delete_one(Filter::by_id(id))
        .await
        .or_internal(&format!("Error deleting {}", R::LABEL))?;

    if result.deleted == 0 {
        return Err(ApiError::not_found(format!("{} not found", R::TITLE)));
    }

    tracing::info!("Deleted {} {}", R::LABEL, id);
    Ok(ApiResponse::ok().message(format!("{} deleted successfully", R::TITLE)))
}

pub async fn get_all<R: Resource>(State(state): State<AppState>) -> ApiResult {
    let records = state
        .repo::<Record<R::Fields>>(R::COLLECTION)
        .select_any(Filter::new())
        .await
        .or_internal(&format!("Error retrieving {}", R::PLURAL))?;

    Ok(ApiResponse::ok().with(R::LIST_KEY, records))
}

pub async fn get_one<R: Resource>(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = parse_object_id(&id, R::LABEL)?;

    let record = state
        .repo::<Record<R::Fields>>(R::COLLECTION)
        .select_one(Filter::by_id(id))
        .await
        .map_err(|err| {
            tracing::error!("Error retrieving {} {}: {}", R::LABEL, id, err);
            ApiError::internal_with_details(format!("Error retrieving {}", R::LABEL), err.to_string())
        })?
        .ok_or_else(|| ApiError::not_found(format!("{} not found", R::TITLE)))?;

    Ok(ApiResponse::ok().with(R::ITEM_KEY, record))
}
