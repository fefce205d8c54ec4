use axum::extract::{Path, State};
use chrono::Utc;

use crate::database::models::{CategoryInput, CategoryPatch, ExpenseCategory, EXPENSE_CATEGORIES};
use crate::database::{Repository, Update};
use crate::error::{ApiError, StoreResultExt};
use crate::filter::Filter;
use crate::middleware::{parse_object_id, ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::state::AppState;

use super::{load_owned, owned_by};

const LABEL: &str = "expense category";
const NOT_FOUND: &str = "Expense category not found";

fn categories(state: &AppState) -> Repository<ExpenseCategory> {
    state.repo::<ExpenseCategory>(EXPENSE_CATEGORIES)
}

/// POST /portfolio/expense/category/create
pub async fn create(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(input): JsonBody<CategoryInput>,
) -> ApiResult {
    let owner = caller.owner_id()?;
    let now = Utc::now();
    let category = ExpenseCategory {
        id: uuid::Uuid::new_v4(),
        title: input.title,
        description: input.description,
        kind: input.kind,
        user_id: owner,
        t1: input.t1,
        t2: input.t2,
        created_at: now,
        updated_at: now,
    };

    categories(&state)
        .insert(&category)
        .await
        .or_internal("Error creating expense category")?;

    tracing::info!("Account {} created expense category {}", owner, category.id);
    Ok(ApiResponse::created().message("Expense Category created successfully"))
}

/// PUT /portfolio/expense/category/update/:id
pub async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<CategoryPatch>,
) -> ApiResult {
    let id = parse_object_id(&id, LABEL)?;
    let owner = caller.owner_id()?;
    let repo = categories(&state);

    load_owned(
        &repo,
        id,
        owner,
        NOT_FOUND,
        "You are not allowed to update this expense category",
    )
    .await?;

    let update = patch.apply(Update::stamped(Utc::now()))?;
    let result = repo.update_one(owned_by(id, owner), update).await.map_err(|err| {
        tracing::error!("Error updating expense category {}: {}", id, err);
        ApiError::internal_with_details("Error updating expense category", err.to_string())
    })?;
    if result.matched == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    Ok(ApiResponse::ok().message("Expense category updated successfully"))
}

/// DELETE /portfolio/expense/category/delete/:id
pub async fn delete(State(state): State<AppState>, caller: AuthUser, Path(id): Path<String>) -> ApiResult {
    let id = parse_object_id(&id, LABEL)?;
    let owner = caller.owner_id()?;
    let repo = categories(&state);

    load_owned(
        &repo,
        id,
        owner,
        NOT_FOUND,
        "You are not allowed to delete this expense category",
    )
    .await?;

    let result = repo
        .delete_one(owned_by(id, owner))
        .await
        .or_internal("Error deleting expense category")?;
    if result.deleted == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!("Account {} deleted expense category {}", owner, id);
    Ok(ApiResponse::ok().message("Expense category deleted successfully"))
}

/// GET /portfolio/expense/category/get-all
pub async fn get_all(State(state): State<AppState>, caller: AuthUser) -> ApiResult {
    let owner = caller.owner_id()?;
    let found = categories(&state)
        .select_any(Filter::new().eq("user_id", owner))
        .await
        .or_internal("Error retrieving expense categories")?;

    Ok(ApiResponse::ok().with("categories", found))
}

/// GET /portfolio/expense/category/get-one/:id
pub async fn get_one(State(state): State<AppState>, caller: AuthUser, Path(id): Path<String>) -> ApiResult {
    let id = parse_object_id(&id, LABEL)?;
    let owner = caller.owner_id()?;

    let category = categories(&state)
        .select_one(owned_by(id, owner))
        .await
        .map_err(|err| {
            tracing::error!("Error retrieving expense category {}: {}", id, err);
            ApiError::internal_with_details("Error retrieving expense category", err.to_string())
        })?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(ApiResponse::ok().with("category", category))
}
