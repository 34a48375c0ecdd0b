//! # 에러 처리 모듈
//!
//! 애플리케이션에서 발생할 수 있는 모든 에러를 `AppError` 하나로 모으고,
//! `IntoResponse` 구현으로 HTTP 응답에 매핑합니다.
//!
//! 응답 본문 형식:
//! `{ "error": { "code": "...", "message": "...", "details": {...}? } }`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::services::importer::ImportError;

/// 애플리케이션 에러
///
/// 핸들러가 `Result<T, AppError>`를 반환하면 Axum이 `into_response()`를
/// 호출해 JSON 에러 응답으로 바꿉니다.
#[derive(Debug, Error)]
pub enum AppError {
    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    #[error("Resource not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 서버 내부 오류 (HTTP 500). 메시지는 로그에만 남습니다.
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// 운동 시트 가져오기 실패
    #[error(transparent)]
    Import(#[from] ImportError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details: Option<Value> = None;

        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Io(ref e) => {
                tracing::error!("IO error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "io_error",
                    "An IO error occurred".to_string(),
                )
            }
            AppError::Unauthorized(ref msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            AppError::Import(ref e) => match e {
                // 다른 트레이너의 학생 존재 여부가 드러나지 않도록 일반 404와 똑같이 응답
                ImportError::StudentNotFound => (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    AppError::NotFound.to_string(),
                ),
                ImportError::UnsupportedFileType => {
                    (StatusCode::BAD_REQUEST, "unsupported_file_type", e.to_string())
                }
                ImportError::MissingColumns { missing, found } => {
                    details = Some(json!({ "missing": missing, "found": found }));
                    (StatusCode::BAD_REQUEST, "missing_columns", e.to_string())
                }
                ImportError::EmptyImport => (StatusCode::BAD_REQUEST, "empty_import", e.to_string()),
                ImportError::ParseFailure(msg) => {
                    tracing::error!("Error parsing workout sheet: {}", msg);
                    (
                        StatusCode::BAD_REQUEST,
                        "parse_failure",
                        "Failed to process file".to_string(),
                    )
                }
            },
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_not_found_is_reported_as_plain_not_found() {
        let import = AppError::from(ImportError::StudentNotFound).into_response();
        let plain = AppError::NotFound.into_response();
        assert_eq!(import.status(), plain.status());
        assert_eq!(import.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn parse_failure_is_a_client_error() {
        let response =
            AppError::from(ImportError::ParseFailure("corrupt zip".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_columns_is_a_client_error() {
        let err = ImportError::MissingColumns {
            missing: vec!["day".to_string()],
            found: vec!["Exercise".to_string(), "Reps".to_string()],
        };
        assert_eq!(AppError::from(err).into_response().status(), StatusCode::BAD_REQUEST);
    }
}
