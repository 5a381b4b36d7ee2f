use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::types::{BillId, BillType, FamilyId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub family_id: FamilyId,
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub bill_type: BillType,
    /// Smallest currency unit, always > 0
    pub amount: i64,
    pub category: String,
    pub description: String,
    pub object: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

// bill_type is stored as text, so the row is decoded by hand
impl<'r> FromRow<'r, PgRow> for Bill {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let raw_type: String = row.try_get("bill_type")?;
        let bill_type = raw_type.parse::<BillType>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "bill_type".to_string(),
            source: Box::new(e),
        })?;

        Ok(Self {
            id: row.try_get("id")?,
            family_id: row.try_get("family_id")?,
            date: row.try_get("bill_date")?,
            bill_type,
            amount: row.try_get("amount")?,
            category: row.try_get("category")?,
            description: row.try_get("description")?,
            object: row.try_get("object")?,
            username: row.try_get("username")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewBill {
    pub date: NaiveDateTime,
    pub bill_type: BillType,
    pub amount: i64,
    pub category: String,
    pub description: String,
    pub object: String,
    pub username: String,
}
