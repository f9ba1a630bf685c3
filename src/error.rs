use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Errors surfaced at the HTTP boundary; the resolution engine itself cannot fail
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedBody(rejection) => rejection.status(),
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::MalformedBody(rejection) => rejection.body_text(),
            AppError::InvalidInput(msg) => msg.clone(),
        };

        tracing::warn!(status = status.as_u16(), error = %message, "Request rejected");

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_is_bad_request() {
        let response = AppError::InvalidInput("bad country".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_display() {
        let err = AppError::InvalidInput("country must be two letters".to_string());
        assert_eq!(err.to_string(), "Invalid input: country must be two letters");
    }
}
