pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use extract::{parse_bill_id, parse_family_id, ValidJson};
pub use response::{ApiResponse, ApiResult, ERRNO_OK};
