use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

use crate::services::error::ServiceError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `POINT_BUDGET_EXCEEDED`,
    /// `TOKEN_MISSING`, `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `ACCOUNT_NOT_ACTIVATED`,
    /// `PERMISSION_DENIED`, `REGISTRATION_CLOSED`, `SELECTIONS_CLOSED`, `NOT_FOUND`,
    /// `INDEX_TAKEN`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Points must be between 0 and 15")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    PointBudgetExceeded {
        total: i64,
        budget: i32,
    },
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    AccountNotActivated,
    PermissionDenied,
    RegistrationClosed,
    SelectionsClosed,
    NotFound(String),
    IndexTaken,
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::PointBudgetExceeded { total, budget } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "POINT_BUDGET_EXCEEDED",
                    message: format!(
                        "Lab terms were given {} points in total; at most {} are allowed",
                        total, budget
                    ),
                },
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_MISSING",
                    message: "Authentication required".into(),
                },
            ),
            AppError::TokenInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "TOKEN_INVALID",
                    message: "Invalid or expired token".into(),
                },
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "INVALID_CREDENTIALS",
                    message: "Invalid index or password".into(),
                },
            ),
            AppError::AccountNotActivated => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "ACCOUNT_NOT_ACTIVATED",
                    message: "Account is waiting for activation by an administrator".into(),
                },
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "PERMISSION_DENIED",
                    message: "Insufficient permissions".into(),
                },
            ),
            AppError::RegistrationClosed => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "REGISTRATION_CLOSED",
                    message: "Registration is currently closed".into(),
                },
            ),
            AppError::SelectionsClosed => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "SELECTIONS_CLOSED",
                    message: "Term selections are currently closed".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::IndexTaken => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "INDEX_TAKEN",
                    message: "A student with this index is already registered".into(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { entity, id } => {
                tracing::debug!("{entity} {id} not found");
                AppError::NotFound(format!("{entity} not found"))
            }
            ServiceError::PointBudgetExceeded { total, budget, .. } => {
                AppError::PointBudgetExceeded { total, budget }
            }
            ServiceError::Invalid(msg) => AppError::Validation(msg),
            ServiceError::PasswordHash(e) => AppError::Internal(format!("Hash error: {e}")),
            ServiceError::Lookup(e) => {
                AppError::Internal(format!("Stored schedule code is invalid: {e}"))
            }
            ServiceError::Database(e) => AppError::Internal(e.to_string()),
        }
    }
}
