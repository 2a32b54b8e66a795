use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Upstream provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) | AppError::Duplicate(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            AppError::MissingField(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::UpstreamUnavailable(ref detail) => {
                tracing::error!(error = %detail, "Upstream provider failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream provider unavailable".to_string(),
                )
            }
            AppError::Database(_) | AppError::HttpClient(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::MissingField("title"), StatusCode::BAD_REQUEST),
            (AppError::Duplicate("x".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (
                AppError::UpstreamUnavailable("timeout".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_missing_field_message() {
        let error = AppError::MissingField("externalId");
        assert_eq!(error.to_string(), "missing required field: externalId");
    }
}
