// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseError;
use crate::services::LedgerError;

/// HTTP API error. Each variant carries the five-digit errno reported to clients.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized { errno: u32, message: String },

    // 403 Forbidden
    Forbidden { errno: u32, message: String },

    // 404 Not Found
    NotFound { errno: u32, message: String },

    // 409 Conflict
    Conflict { errno: u32, message: String },

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized { .. } => 401,
            ApiError::Forbidden { .. } => 403,
            ApiError::NotFound { .. } => 404,
            ApiError::Conflict { .. } => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    pub fn errno(&self) -> u32 {
        match self {
            ApiError::BadRequest(_) => 40000,
            ApiError::Unauthorized { errno, .. }
            | ApiError::Forbidden { errno, .. }
            | ApiError::NotFound { errno, .. }
            | ApiError::Conflict { errno, .. } => *errno,
            ApiError::InternalServerError(_) => 50000,
            ApiError::ServiceUnavailable(_) => 50300,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized { message, .. } => message,
            ApiError::Forbidden { message, .. } => message,
            ApiError::NotFound { message, .. } => message,
            ApiError::Conflict { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::Forbidden { .. } => "FORBIDDEN",
            ApiError::NotFound { .. } => "NOT_FOUND",
            ApiError::Conflict { .. } => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "errno": self.errno(),
            "code": self.error_code(),
            "message": self.message()
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    /// Missing or unverifiable token
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            errno: 40100,
            message: message.into(),
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let message = err.to_string();
        match err {
            LedgerError::MalformedInput(msg) => ApiError::BadRequest(msg),
            LedgerError::Unauthenticated => ApiError::Unauthorized { errno: 40101, message },
            LedgerError::BadCredentials => ApiError::Unauthorized { errno: 40102, message },
            LedgerError::NotAMember(_) => ApiError::Forbidden { errno: 40300, message },
            LedgerError::ImpersonationDenied => ApiError::Forbidden { errno: 40010, message },
            LedgerError::BadJoinPassword => ApiError::Forbidden { errno: 40007, message },
            LedgerError::FamilyNotFound(_) => ApiError::NotFound { errno: 40004, message },
            LedgerError::UserNotFound(_) | LedgerError::PhoneNotFound(_) => {
                ApiError::NotFound { errno: 40005, message }
            }
            LedgerError::BillNotFound(_) => ApiError::NotFound { errno: 40002, message },
            LedgerError::AlreadyMember { .. } => ApiError::Conflict { errno: 40006, message },
            LedgerError::AlreadyRegistered(_) => ApiError::Conflict { errno: 40009, message },
            LedgerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            LedgerError::Store(db_err) => db_err.into(),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConnectionError(msg) => {
                tracing::error!("Database connection error: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            // Don't expose internal SQL errors to clients
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
