use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::application::ServiceError;

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    /// アプリケーション層のエラー
    Service(ServiceError),
    /// リクエストの検証エラー
    Validation(String),
    /// 認証エラー（トークンの欠落・無効）
    Unauthorized,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError::Service(err)
    }
}

impl From<garde::Report> for ApiError {
    fn from(report: garde::Report) -> Self {
        ApiError::Validation(report.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            // 404 Not Found - 存在しないか、操作者の所有物ではない（区別しない）
            ApiError::Service(ServiceError::NotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", "Not found")
            }

            // 409 Conflict - 現在の状態と両立しない操作
            ApiError::Service(ServiceError::BookNotAvailable) => (
                StatusCode::CONFLICT,
                "BOOK_NOT_AVAILABLE",
                "Book is not available for lending",
            ),
            ApiError::Service(ServiceError::EmailTaken) => (
                StatusCode::CONFLICT,
                "EMAIL_TAKEN",
                "Email address is already registered",
            ),

            // 401 Unauthorized - 認証の失敗
            ApiError::Service(ServiceError::InvalidCredentials) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid email or password",
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Missing or invalid access token",
            ),

            // 400 Bad Request - 入力の検証エラー
            ApiError::Service(ServiceError::Validation(ref msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.as_str())
            }
            ApiError::Validation(ref msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.as_str())
            }

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApiError::Service(ServiceError::Repository(ref e)) => {
                tracing::error!("Repository error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "REPOSITORY_ERROR",
                    "An unexpected error occurred",
                )
            }
            ApiError::Service(ServiceError::PasswordHash(ref e)) => {
                tracing::error!("Password hash error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred",
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
