// handlers/visitor.rs - Visitor logs
//
// Creation runs behind `capture_visitor`, which builds the log from the
// request; the body is ignored.

use axum::{extract::State, Extension};

use crate::database::models::{LayoutKind, VisitorFields, VisitorLog, LAYOUTS, VIEW_COUNT};
use crate::database::{Document, PatchError, Update};
use crate::error::{ApiError, StoreResultExt};
use crate::filter::Filter;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

use super::resource::{NoPatch, Resource};

pub struct Visitors;

impl Resource for Visitors {
    const COLLECTION: &'static str = "VisitorLogs";
    const LABEL: &'static str = "visitor log";
    const TITLE: &'static str = "Visitor log";
    const PLURAL: &'static str = "visitor logs";
    const LIST_KEY: &'static str = "data";
    const ITEM_KEY: &'static str = "data";

    type Fields = VisitorFields;
    type Patch = NoPatch;

    fn apply(_patch: &NoPatch, update: Update) -> Result<Update, PatchError> {
        Ok(update)
    }
}

pub async fn create(State(state): State<AppState>, log: Option<Extension<VisitorLog>>) -> ApiResult {
    let Extension(log) = log.ok_or_else(|| ApiError::bad_request("Visitor log not found in context"))?;

    // Counter first; a missing about_me layout matches nothing and is not an error
    let bumped = state
        .repo::<Document>(LAYOUTS)
        .update_one(
            Filter::new().eq("type", LayoutKind::AboutMe.as_str()),
            Update::new().inc(&format!("data.{}", VIEW_COUNT), 1),
        )
        .await
        .or_internal("Error updating view count in layout")?;
    if bumped.matched == 0 {
        tracing::debug!("No about_me layout to count visit against");
    }

    state
        .repo::<VisitorLog>(Visitors::COLLECTION)
        .insert(&log)
        .await
        .or_internal("Error saving visitor log")?;

    tracing::info!(ip = %log.fields.ip, path = %log.fields.path, "Visitor log saved");
    Ok(ApiResponse::created().message("Visitor log saved successfully"))
}
