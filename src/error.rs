use accounts::AccountError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use sea_orm::DbErr;
use tracing::error;

use crate::schemas::ErrorResponse;

/// An error leaving a handler: HTTP status plus the `ErrorResponse` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, code, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message,
            code: self.code.to_string(),
            success: false,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::DuplicateEmail(_) => {
                ApiError::conflict("EMAIL_ALREADY_EXISTS", err.to_string())
            }
            AccountError::InvalidCredentials => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password",
            ),
            AccountError::NotFound { .. } => ApiError::not_found(err.to_string()),
            AccountError::EmptySecret => ApiError::bad_request("INVALID_PASSWORD", err.to_string()),
            AccountError::SelfConnection => {
                ApiError::bad_request("SELF_CONNECTION", err.to_string())
            }
            AccountError::AlreadyConnected(..) => {
                ApiError::conflict("ALREADY_CONNECTED", err.to_string())
            }
            AccountError::DuplicateRequest { .. } => {
                ApiError::conflict("DUPLICATE_REQUEST", err.to_string())
            }
            AccountError::RequestAlreadyResolved { .. } => {
                ApiError::conflict("REQUEST_ALREADY_RESOLVED", err.to_string())
            }
            AccountError::NotRequestTarget { .. } => {
                ApiError::new(StatusCode::FORBIDDEN, "NOT_REQUEST_TARGET", err.to_string())
            }
            AccountError::Hashing(ref detail) => {
                error!("Password hashing failed: {}", detail);
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error",
                )
            }
            AccountError::Database(db_error) => db_error.into(),
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        error!("Database error: {}", err);
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "DATABASE_ERROR",
            "Internal server error",
        )
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use model::entities::connection_request::ConnectionStatus;

    #[test]
    fn test_account_errors_map_to_status_and_code() {
        let cases = [
            (
                AccountError::DuplicateEmail("a@example.com".into()),
                StatusCode::CONFLICT,
                "EMAIL_ALREADY_EXISTS",
            ),
            (
                AccountError::InvalidCredentials,
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
            ),
            (
                AccountError::NotFound {
                    entity: "Developer",
                    id: 3,
                },
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                AccountError::EmptySecret,
                StatusCode::BAD_REQUEST,
                "INVALID_PASSWORD",
            ),
            (
                AccountError::SelfConnection,
                StatusCode::BAD_REQUEST,
                "SELF_CONNECTION",
            ),
            (
                AccountError::AlreadyConnected(1, 2),
                StatusCode::CONFLICT,
                "ALREADY_CONNECTED",
            ),
            (
                AccountError::DuplicateRequest { from: 1, to: 2 },
                StatusCode::CONFLICT,
                "DUPLICATE_REQUEST",
            ),
            (
                AccountError::RequestAlreadyResolved {
                    id: 1,
                    status: ConnectionStatus::Accepted,
                },
                StatusCode::CONFLICT,
                "REQUEST_ALREADY_RESOLVED",
            ),
            (
                AccountError::NotRequestTarget { id: 1, responder: 2 },
                StatusCode::FORBIDDEN,
                "NOT_REQUEST_TARGET",
            ),
            (
                AccountError::Hashing("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
            (
                AccountError::Database(DbErr::Custom("gone".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
            assert_eq!(api.code, code);
        }
    }

    #[test]
    fn test_internal_errors_do_not_leak_detail() {
        let api: ApiError = AccountError::Database(DbErr::Custom("secret table".into())).into();
        assert!(!api.message.contains("secret table"));
    }
}
