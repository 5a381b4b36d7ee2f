use thiserror::Error;

use crate::database::DatabaseError;
use crate::filter::FilterError;
use crate::types::{BillId, FamilyId, UserId};

/// Every way a ledger operation can fail. Callers branch on the variant,
/// never on the message.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    MalformedInput(String),

    #[error("unauthorized, user in token not found")]
    Unauthenticated,

    #[error("user is not in family {0}")]
    NotAMember(FamilyId),

    #[error("user cannot modify other user's family")]
    ImpersonationDenied,

    #[error("user {user_id} is already in family {family_id}")]
    AlreadyMember { user_id: UserId, family_id: FamilyId },

    #[error("family password is incorrect")]
    BadJoinPassword,

    #[error("family {0} does not exist")]
    FamilyNotFound(FamilyId),

    #[error("user {0} does not exist")]
    UserNotFound(UserId),

    #[error("user with phone {0} does not exist")]
    PhoneNotFound(String),

    #[error("bill {0} not found in this family")]
    BillNotFound(BillId),

    #[error("{0} is already registered")]
    AlreadyRegistered(&'static str),

    #[error("phone or password is incorrect")]
    BadCredentials,

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

impl From<FilterError> for LedgerError {
    fn from(err: FilterError) -> Self {
        LedgerError::MalformedInput(err.to_string())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Mirrors the column's `VARCHAR(max)`, which counts characters
pub(crate) fn ensure_max_chars(field: &str, value: &str, max: usize) -> LedgerResult<()> {
    if value.chars().count() > max {
        return Err(LedgerError::MalformedInput(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}
