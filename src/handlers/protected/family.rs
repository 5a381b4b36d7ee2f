// handlers/protected/family.rs - /family/* handlers

use axum::extract::{Path, State};
use axum::Extension;
use serde_json::{json, Value};

use crate::database::models::{Family, FamilyMember};
use crate::handlers::dto::{CreateFamilyRequest, JoinFamilyRequest};
use crate::middleware::{parse_family_id, ApiResponse, ApiResult, AuthUser, ValidJson};
use crate::services::JoinRequest;
use crate::state::AppState;

/**
 * POST /family/create - Create a family
 *
 * ```json
 * { "name": "Smiths", "password": "abc123" }
 * ```
 *
 * The creator is not enrolled; they join with `/family/join` like anyone else.
 */
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(body): ValidJson<CreateFamilyRequest>,
) -> ApiResult<Family> {
    body.validate()?;
    let family = state
        .families
        .create_family(&auth, body.name, body.password)
        .await?;
    Ok(ApiResponse::created(family))
}

/**
 * POST /family/join - Enroll a user with the family's join password
 *
 * ```json
 * { "family_id": 1, "user_id": 7, "role": "father", "password": "abc123" }
 * ```
 *
 * `role` is one of father, mother, son, daughter, grandfather, grandmother, other.
 */
pub async fn join(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ValidJson(body): ValidJson<JoinFamilyRequest>,
) -> ApiResult<Value> {
    let family_id = body.family_id;
    let user_id = body.user_id;
    state.families.join_family(&auth, JoinRequest::try_from(body)?).await?;

    Ok(ApiResponse::success(json!({ "family_id": family_id, "user_id": user_id }))
        .with_message("joined family"))
}

/// GET /family/list
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<Family>> {
    let families = state.families.list_families(&auth).await?;
    Ok(ApiResponse::success(families))
}

/// GET /family/:family_id/members - members only
pub async fn members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(family_id): Path<String>,
) -> ApiResult<Vec<FamilyMember>> {
    let family_id = parse_family_id(&family_id)?;
    let members = state.families.list_members(&auth, family_id).await?;
    Ok(ApiResponse::success(members))
}
