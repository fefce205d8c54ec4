use axum::extract::{Path, State};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use serde::Deserialize;

use crate::database::models::{
    is_valid_amount, ExpenseCategory, ExpenseItem, ExpenseType, ItemInput, ItemPatch, EXPENSE_CATEGORIES,
    EXPENSE_ITEMS,
};
use crate::database::{Patch, Repository, Update};
use crate::error::{ApiError, StoreResultExt};
use crate::filter::Filter;
use crate::middleware::{parse_object_id, ApiResponse, ApiResult, AuthUser, JsonBody, QueryParams};
use crate::state::AppState;

use super::{load_owned, owned_by};

const LABEL: &str = "expense item";
const NOT_FOUND: &str = "Expense item not found or access denied";

fn items(state: &AppState) -> Repository<ExpenseItem> {
    state.repo::<ExpenseItem>(EXPENSE_ITEMS)
}

fn invalid_amount() -> ApiError {
    ApiError::bad_request("Amount must be a non-negative number")
}

/// POST /portfolio/expense/item/create
pub async fn create(State(state): State<AppState>, caller: AuthUser, JsonBody(input): JsonBody<ItemInput>) -> ApiResult {
    let owner = caller.owner_id()?;
    if !is_valid_amount(input.amount) {
        return Err(invalid_amount());
    }

    let category: ExpenseCategory = load_owned(
        &state.repo(EXPENSE_CATEGORIES),
        input.category_id,
        owner,
        "Expense category not found",
        "You are not allowed to use this expense category",
    )
    .await?;

    let now = Utc::now();
    let item = ExpenseItem {
        id: uuid::Uuid::new_v4(),
        category_id: category.id,
        user_id: owner,
        kind: input.kind.unwrap_or(category.kind),
        title: input.title,
        remark: input.remark,
        amount: input.amount,
        t1: input.t1,
        t2: input.t2,
        created_at: now,
        updated_at: now,
    };

    items(&state).insert(&item).await.or_internal("Error creating expense item")?;

    tracing::info!("Account {} recorded {} item {}", owner, item.kind.code(), item.id);
    Ok(ApiResponse::created().message("Expense item created successfully"))
}

/// PUT /portfolio/expense/item/update/:id
pub async fn update(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<ItemPatch>,
) -> ApiResult {
    let id = parse_object_id(&id, LABEL)?;
    let owner = caller.owner_id()?;
    if let Patch::Value(amount) = &patch.amount {
        if !is_valid_amount(*amount) {
            return Err(invalid_amount());
        }
    }

    let repo = items(&state);
    load_owned(&repo, id, owner, NOT_FOUND, "You are not allowed to update this expense item").await?;

    let update = patch.apply(Update::stamped(Utc::now()))?;
    let result = repo
        .update_one(owned_by(id, owner), update)
        .await
        .or_internal("Error updating expense item")?;
    if result.matched == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    Ok(ApiResponse::ok().message("Expense item updated successfully"))
}

/// DELETE /portfolio/expense/item/delete/:id
pub async fn delete(State(state): State<AppState>, caller: AuthUser, Path(id): Path<String>) -> ApiResult {
    let id = parse_object_id(&id, LABEL)?;
    let owner = caller.owner_id()?;
    let repo = items(&state);

    load_owned(&repo, id, owner, NOT_FOUND, "You are not allowed to delete this expense item").await?;

    let result = repo
        .delete_one(owned_by(id, owner))
        .await
        .or_internal("Error deleting expense item")?;
    if result.deleted == 0 {
        return Err(ApiError::not_found(NOT_FOUND));
    }

    tracing::info!("Account {} deleted expense item {}", owner, id);
    Ok(ApiResponse::ok().message("Expense item deleted successfully"))
}

/// GET /portfolio/expense/item/get-one/:id
pub async fn get_one(State(state): State<AppState>, caller: AuthUser, Path(id): Path<String>) -> ApiResult {
    let id = parse_object_id(&id, LABEL)?;
    let owner = caller.owner_id()?;

    let item = items(&state)
        .select_one(owned_by(id, owner))
        .await
        .or_internal("Error retrieving expense item")?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    Ok(ApiResponse::ok().with("item", item))
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<String>,
}

/// GET /portfolio/expense/item/incomes?year=YYYY
pub async fn incomes(
    State(state): State<AppState>,
    caller: AuthUser,
    QueryParams(query): QueryParams<YearQuery>,
) -> ApiResult {
    by_year(&state, &caller, &query, ExpenseType::Income, "incomes").await
}

/// GET /portfolio/expense/item/outcomes?year=YYYY
pub async fn outcomes(
    State(state): State<AppState>,
    caller: AuthUser,
    QueryParams(query): QueryParams<YearQuery>,
) -> ApiResult {
    by_year(&state, &caller, &query, ExpenseType::Outflow, "outcomes").await
}

async fn by_year(
    state: &AppState,
    caller: &AuthUser,
    query: &YearQuery,
    kind: ExpenseType,
    key: &'static str,
) -> ApiResult {
    let owner = caller.owner_id()?;
    let year = parse_year(query.year.as_deref())?;
    let (start, end) = year_window(year, state.config.expense.utc_offset_minutes)
        .ok_or_else(|| ApiError::bad_request("Invalid year format"))?;

    let filter = Filter::new()
        .eq("user_id", owner)
        .eq("type", kind.code())
        .between("created_at", start, end);

    let found = items(state)
        .select_any(filter)
        .await
        .or_internal(&format!("Error retrieving {}", key))?;

    Ok(ApiResponse::ok().with(key, found))
}

pub fn parse_year(raw: Option<&str>) -> Result<i32, ApiError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Err(ApiError::bad_request("Year is required")),
        Some(raw) => raw,
    };
    match raw.parse::<i32>() {
        Ok(year) if (1..=9999).contains(&year) => Ok(year),
        _ => Err(ApiError::bad_request("Invalid year format")),
    }
}

/// First and last instant of `year` in the given fixed offset, inclusive.
pub fn year_window(year: i32, utc_offset_minutes: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let offset = FixedOffset::east_opt(utc_offset_minutes.checked_mul(60)?)?;
    let start = offset.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
    let last_second = offset.with_ymd_and_hms(year, 12, 31, 23, 59, 59).single()?;
    let end = last_second + Duration::nanoseconds(999_999_999);
    Some((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}
