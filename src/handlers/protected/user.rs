// handlers/protected/user.rs - /user/* handlers

use axum::extract::{Path, State};
use axum::Extension;

use crate::database::models::User;
use crate::handlers::dto::UpdateUserRequest;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson};
use crate::state::AppState;

/// GET /user/info/:phone - look up any user by phone
pub async fn info(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(phone): Path<String>,
) -> ApiResult<User> {
    let user = state.accounts.info(&auth, &phone).await?;
    Ok(ApiResponse::success(user))
}

/// POST /user/update - change the caller's own username and/or password
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(body): ValidJson<UpdateUserRequest>,
) -> ApiResult<User> {
    let user = state
        .accounts
        .update_self(&auth, body.username, body.password)
        .await?;
    Ok(ApiResponse::success(user).with_message("updated"))
}

/// GET /user/list
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<User>> {
    let users = state.accounts.list_users(&auth).await?;
    Ok(ApiResponse::success(users))
}
