// handlers/user.rs - Expense tracker accounts under /portfolio/user and
// /portfolio/expense/user

use axum::extract::{Path, State};
use chrono::Utc;

use crate::auth::{hash_password, is_acceptable_password, validate_email_format, verify_password, Role};
use crate::database::models::{
    LoginRequest, PasswordChangeRequest, RegisterRequest, RoleChangeRequest, UpdateInfoRequest, User, UserView,
    USERS,
};
use crate::database::{Patch, Repository, Update};
use crate::error::{ApiError, StoreResultExt};
use crate::filter::Filter;
use crate::middleware::{parse_object_id, ApiResponse, ApiResult, AuthUser, JsonBody};
use crate::state::AppState;

fn users(state: &AppState) -> Repository<User> {
    state.repo::<User>(USERS)
}

/// POST /portfolio/user/register
pub async fn register(State(state): State<AppState>, JsonBody(body): JsonBody<RegisterRequest>) -> ApiResult {
    if validate_email_format(&body.email).is_err() {
        return Err(ApiError::bad_request("Invalid email format!"));
    }
    if !is_acceptable_password(&body.password) {
        return Err(ApiError::bad_request("Invalid password!"));
    }

    let repo = users(&state);
    let existing = repo
        .count(Filter::new().eq("email", body.email.as_str()))
        .await
        .or_internal("Error retrieving user")?;
    if existing > 0 {
        return Err(ApiError::conflict("User already exists!"));
    }

    let now = Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4(),
        name: body.name,
        email: body.email,
        password: hash_password(&body.password)?,
        avatar: body.avatar,
        role: Role::User,
        t1: String::new(),
        t2: String::new(),
        created_at: now,
        updated_at: now,
    };

    repo.insert(&user).await.or_internal("Error creating user")?;

    tracing::info!("Registered user {}", user.id);
    Ok(ApiResponse::created().message("User created successfully"))
}

/// POST /portfolio/user/login
pub async fn login(State(state): State<AppState>, JsonBody(body): JsonBody<LoginRequest>) -> ApiResult {
    let user = users(&state)
        .select_one(Filter::new().eq("email", body.email.as_str()))
        .await
        .or_internal("Internal server error")?
        .ok_or_else(|| {
            tracing::warn!("Login for unknown email {}", body.email);
            ApiError::unauthorized("Invalid email")
        })?;

    if !verify_password(&body.password, &user.password)? {
        tracing::warn!("Wrong password for user {}", user.id);
        return Err(ApiError::unauthorized("Invalid password"));
    }

    let token = state
        .tokens
        .issue(&user.email, &user.id.to_string(), user.role)
        .map_err(|e| {
            tracing::error!("Error generating token: {}", e);
            ApiError::internal_server_error("Error generating token")
        })?;

    Ok(ApiResponse::ok()
        .message("Login successful")
        .with("accessToken", token)
        .with("user", UserView::from(user)))
}

async fn load_current(state: &AppState, caller: &AuthUser) -> Result<User, ApiError> {
    let id = caller.owner_id()?;
    users(state)
        .select_one(Filter::by_id(id))
        .await
        .map_err(|err| {
            tracing::error!("Error retrieving user {}: {}", id, err);
            ApiError::internal_with_details("Error retrieving user", err.to_string())
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))
}

/// GET /portfolio/expense/user/me
pub async fn me(State(state): State<AppState>, caller: AuthUser) -> ApiResult {
    let user = load_current(&state, &caller).await?;
    Ok(ApiResponse::ok()
        .message("User retrieved successfully")
        .with("users", UserView::from(user)))
}

/// PUT /portfolio/expense/user/update
pub async fn update_info(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(body): JsonBody<UpdateInfoRequest>,
) -> ApiResult {
    let id = caller.owner_id()?;
    let repo = users(&state);

    if let Patch::Value(email) = &body.email {
        validate_email_format(email).map_err(|_| ApiError::bad_request("Invalid email format!"))?;
        let taken = repo
            .count(Filter::new().eq("email", email.as_str()).ne("_id", id))
            .await
            .or_internal("Error checking email")?;
        if taken > 0 {
            return Err(ApiError::conflict("Email is already in use"));
        }
    }

    let update = Update::stamped(Utc::now())
        .require("name", &body.name)?
        .require("email", &body.email)?
        .require("avatar", &body.avatar)?;

    let result = repo
        .update_one(Filter::by_id(id), update)
        .await
        .or_internal("Error updating user")?;
    if result.matched == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    let updated = repo.select_404(Filter::by_id(id), "User not found").await?;

    Ok(ApiResponse::ok()
        .message("User updated successfully")
        .with("user", UserView::from(updated)))
}

/// PUT /portfolio/expense/user/password
pub async fn change_password(
    State(state): State<AppState>,
    caller: AuthUser,
    JsonBody(body): JsonBody<PasswordChangeRequest>,
) -> ApiResult {
    let user = load_current(&state, &caller).await?;

    if !verify_password(&body.current_password, &user.password)? {
        tracing::warn!("Password change for {} with wrong current password", user.id);
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }
    if !is_acceptable_password(&body.new_password) {
        return Err(ApiError::bad_request("Invalid password!"));
    }

    let hashed = hash_password(&body.new_password)?;
    let result = users(&state)
        .update_one(Filter::by_id(user.id), Update::stamped(Utc::now()).set("password", hashed))
        .await
        .or_internal("Error updating password")?;
    if result.matched == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    Ok(ApiResponse::ok().message("Password updated successfully"))
}

/// PUT /portfolio/expense/user/role - admin only
pub async fn change_role(State(state): State<AppState>, JsonBody(body): JsonBody<RoleChangeRequest>) -> ApiResult {
    let id = parse_object_id(&body.user_id, "user")?;
    let role = Role::try_from(body.role).map_err(ApiError::bad_request)?;

    let result = users(&state)
        .update_one(Filter::by_id(id), Update::stamped(Utc::now()).set("role", i64::from(role)))
        .await
        .or_internal("Error updating user role")?;
    if result.matched == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!("User {} is now {}", id, role);
    Ok(ApiResponse::ok().message("User role updated successfully"))
}

/// GET /portfolio/expense/user/get-all - admin only
pub async fn get_all(State(state): State<AppState>) -> ApiResult {
    let all: Vec<UserView> = users(&state)
        .select_any(Filter::new())
        .await
        .or_internal("Error retrieving users")?
        .into_iter()
        .map(UserView::from)
        .collect();

    Ok(ApiResponse::ok()
        .message("Users retrieved successfully")
        .with("users", all))
}

/// DELETE /portfolio/expense/user/delete/:id - admin only
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let id = parse_object_id(&id, "user")?;

    let result = users(&state)
        .delete_one(Filter::by_id(id))
        .await
        .or_internal("Error deleting user")?;
    if result.deleted == 0 {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!("Deleted user {}", id);
    Ok(ApiResponse::ok().message("User deleted successfully"))
}
