pub mod error;
pub mod filter;
pub mod types;

pub use error::FilterError;
pub use filter::{parse_bill_date, BillFilter};
pub use types::BillCondition;
