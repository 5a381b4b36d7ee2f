// handlers/dto.rs - Request bodies bound by the handlers

use serde::Deserialize;

use crate::database::models::NewBill;
use crate::error::ApiError;
use crate::filter::{parse_bill_date, BillFilter};
use crate::services::JoinRequest;
use crate::types::{BillType, FamilyId, FamilyRole, UserId};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Required string fields reject the empty string
fn required(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::bad_request(format!("{} is required", field)));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateFamilyRequest {
    pub name: String,
    pub password: String,
}

impl CreateFamilyRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        required("name", &self.name)?;
        required("password", &self.password)
    }
}

/// An unknown role is rejected here, before the service sees it
#[derive(Debug, Deserialize)]
pub struct JoinFamilyRequest {
    pub family_id: FamilyId,
    pub user_id: UserId,
    pub role: FamilyRole,
    pub password: String,
}

impl TryFrom<JoinFamilyRequest> for JoinRequest {
    type Error = ApiError;

    fn try_from(body: JoinFamilyRequest) -> Result<Self, Self::Error> {
        required("password", &body.password)?;

        Ok(JoinRequest {
            family_id: body.family_id,
            user_id: body.user_id,
            role: body.role.as_str().to_string(),
            join_password: body.password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBillRequest {
    pub date: String,
    #[serde(rename = "type")]
    pub bill_type: BillType,
    pub amount: i64,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub object: String,
    pub username: String,
}

impl TryFrom<CreateBillRequest> for NewBill {
    type Error = ApiError;

    fn try_from(body: CreateBillRequest) -> Result<Self, Self::Error> {
        required("category", &body.category)?;
        required("object", &body.object)?;
        required("username", &body.username)?;

        let date = parse_bill_date("date", &body.date).map_err(|e| ApiError::bad_request(e.to_string()))?;
        if body.amount <= 0 {
            return Err(ApiError::bad_request("amount must be a positive integer"));
        }

        Ok(NewBill {
            date,
            bill_type: body.bill_type,
            amount: body.amount,
            category: body.category,
            description: body.description.unwrap_or_default(),
            object: body.object,
            username: body.username,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SelectBillsRequest {
    #[serde(rename = "type")]
    pub bill_type: Option<String>,
    pub category: Option<String>,
    pub object: Option<String>,
    pub username: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TryFrom<SelectBillsRequest> for BillFilter {
    type Error = ApiError;

    fn try_from(body: SelectBillsRequest) -> Result<Self, Self::Error> {
        BillFilter::from_fields(
            body.bill_type.as_deref(),
            body.category.as_deref(),
            body.object.as_deref(),
            body.username.as_deref(),
            body.start_date.as_deref(),
            body.end_date.as_deref(),
        )
        .map_err(|e| ApiError::bad_request(e.to_string()))
    }
}
