use crate::application::ErrorKind;
use crate::application::catalog::CatalogError;
use crate::application::loan::LoanApplicationError;
use crate::application::membership::MembershipError;
use crate::application::reports::ReportError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::error::Error as _;
use thiserror::Error;

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、エラー分類からHTTPステータスを決める。
#[derive(Debug, Error)]
pub enum ApiError {
    /// リクエストの形式が不正（クエリパラメータなど）
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Loan(#[from] LoanApplicationError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Membership(#[from] MembershipError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

impl ApiError {
    fn kind(&self) -> ErrorKind {
        match self {
            ApiError::BadRequest(_) => ErrorKind::PreconditionFailed,
            ApiError::Loan(e) => e.kind(),
            ApiError::Catalog(e) => e.kind(),
            ApiError::Membership(e) => e.kind(),
            ApiError::Report(_) => ErrorKind::Infrastructure,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.kind() {
            // 404 Not Found - リクエストされたリソースが存在しない
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, self.to_string()),

            // 400 Bad Request - 事前条件を満たさない
            ErrorKind::PreconditionFailed => (StatusCode::BAD_REQUEST, self.to_string()),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ErrorKind::Infrastructure => {
                match self.source() {
                    Some(source) => tracing::error!(error = %self, source = %source, "Request failed"),
                    None => tracing::error!(error = %self, "Request failed"),
                }
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
