use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("failed to parse {field}: '{value}' is not a valid date")]
    InvalidDate { field: &'static str, value: String },

    #[error(transparent)]
    InvalidBillType(#[from] crate::types::UnknownBillType),
}
