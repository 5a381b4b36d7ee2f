// handlers/protected/bill.rs - /family/:family_id/bills handlers
//
// All four routes are family-scoped and answer 403 to non-members.

use axum::extract::{Path, State};
use axum::Extension;
use serde_json::{json, Value};

use crate::database::models::{Bill, NewBill};
use crate::filter::BillFilter;
use crate::handlers::dto::{CreateBillRequest, SelectBillsRequest};
use crate::middleware::{parse_bill_id, parse_family_id, ApiResponse, ApiResult, AuthUser, ValidJson};
use crate::state::AppState;

/**
 * POST /family/:family_id/bills - Record a bill
 *
 * ```json
 * {
 *   "date": "2024-01-15 18:30:00",   // or "2024-01-15"
 *   "type": "expense",               // income | expense
 *   "amount": 1200,                  // smallest currency unit, > 0
 *   "category": "food",
 *   "description": "weekly shop",    // optional
 *   "object": "market",
 *   "username": "alice"
 * }
 * ```
 */
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(family_id): Path<String>,
    ValidJson(body): ValidJson<CreateBillRequest>,
) -> ApiResult<Bill> {
    let family_id = parse_family_id(&family_id)?;
    let bill = NewBill::try_from(body)?;
    let bill = state.bills.create(&auth, family_id, bill).await?;
    Ok(ApiResponse::created(bill))
}

/// GET /family/:family_id/bills
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(family_id): Path<String>,
) -> ApiResult<Vec<Bill>> {
    let family_id = parse_family_id(&family_id)?;
    let bills = state.bills.list(&auth, family_id).await?;
    Ok(ApiResponse::success(bills))
}

/**
 * POST /family/:family_id/bills/select - Filtered listing
 *
 * Every field is optional and empty strings are ignored. Present fields are
 * ANDed; the date range is inclusive on both ends.
 *
 * ```json
 * { "type": "expense", "start_date": "2024-01-01", "end_date": "2024-01-31" }
 * ```
 */
pub async fn select(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(family_id): Path<String>,
    ValidJson(body): ValidJson<SelectBillsRequest>,
) -> ApiResult<Vec<Bill>> {
    let family_id = parse_family_id(&family_id)?;
    let filter = BillFilter::try_from(body)?;
    let bills = state.bills.select(&auth, family_id, filter).await?;
    Ok(ApiResponse::success(bills))
}

/// DELETE /family/:family_id/bills/:bill_id - 404 unless the bill belongs to this family
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((family_id, bill_id)): Path<(String, String)>,
) -> ApiResult<Value> {
    let family_id = parse_family_id(&family_id)?;
    let bill_id = parse_bill_id(&bill_id)?;
    state.bills.delete(&auth, family_id, bill_id).await?;
    Ok(ApiResponse::success(json!({ "id": bill_id })).with_message("deleted"))
}
