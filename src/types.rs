/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type UserId = i64;
pub type FamilyId = i64;
pub type BillId = i64;

/// Direction of money movement recorded by a bill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillType {
    Income,
    Expense,
}

impl BillType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillType::Income => "income",
            BillType::Expense => "expense",
        }
    }
}

impl fmt::Display for BillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown bill type '{0}', expected 'income' or 'expense'")]
pub struct UnknownBillType(pub String);

impl FromStr for BillType {
    type Err = UnknownBillType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(BillType::Income),
            "expense" => Ok(BillType::Expense),
            other => Err(UnknownBillType(other.to_string())),
        }
    }
}

/// Roles accepted when binding a join request. Stored as plain text on the
/// membership edge; the services never re-validate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyRole {
    Father,
    Mother,
    Son,
    Daughter,
    Grandfather,
    Grandmother,
    Other,
}

impl FamilyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyRole::Father => "father",
            FamilyRole::Mother => "mother",
            FamilyRole::Son => "son",
            FamilyRole::Daughter => "daughter",
            FamilyRole::Grandfather => "grandfather",
            FamilyRole::Grandmother => "grandmother",
            FamilyRole::Other => "other",
        }
    }
}
