// handlers/public/auth.rs - POST /auth/register and POST /auth/login

use axum::extract::State;

use crate::database::models::User;
use crate::handlers::dto::{LoginRequest, RegisterRequest};
use crate::middleware::{ApiResponse, ApiResult, ValidJson};
use crate::services::LoginOutcome;
use crate::state::AppState;

/**
 * POST /auth/register - Create an account
 *
 * ```json
 * { "username": "alice", "password": "secret1", "phone": "13800000001" }
 * ```
 *
 * 409 when the username or phone is already taken.
 */
pub async fn register(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<RegisterRequest>,
) -> ApiResult<User> {
    let user = state
        .accounts
        .register(&body.username, &body.password, &body.phone)
        .await?;
    Ok(ApiResponse::created(user).with_message("registered"))
}

/**
 * POST /auth/login - Exchange phone and password for a JWT
 *
 * ```json
 * { "phone": "13800000001", "password": "secret1" }
 * ```
 *
 * Returns `{ "token": "...", "user": {...} }`. The token goes in
 * `Authorization: Bearer <token>` on every protected route.
 */
pub async fn login(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> ApiResult<LoginOutcome> {
    let outcome = state.accounts.login(&body.phone, &body.password).await?;
    Ok(ApiResponse::success(outcome).with_message("login successful"))
}
