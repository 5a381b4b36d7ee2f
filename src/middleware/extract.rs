use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::types::{BillId, FamilyId};

/// `Json<T>` whose rejections become the API's 400 envelope instead of axum's
/// plain-text body
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
}

/// Path segments arrive as strings so a bad id is reported through the envelope
pub fn parse_path_id(field: &str, value: &str) -> Result<i64, ApiError> {
    value
        .parse::<u64>()
        .ok()
        .and_then(|id| i64::try_from(id).ok())
        .ok_or_else(|| ApiError::bad_request(format!("{} must be a non-negative integer, got '{}'", field, value)))
}

pub fn parse_family_id(value: &str) -> Result<FamilyId, ApiError> {
    parse_path_id("family_id", value)
}

pub fn parse_bill_id(value: &str) -> Result<BillId, ApiError> {
    parse_path_id("bill_id", value)
}
