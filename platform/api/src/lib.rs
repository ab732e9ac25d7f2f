use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Body returned for every internal failure; the cause only goes to the log.
pub const INTERNAL_MESSAGE: &str = "Sorry, server error. Please try again later.";

/// Shared REST result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Field name to message. Inserting an existing field replaces its message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, message);
        errors
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(())` when nothing failed, otherwise the aggregated error.
    pub fn into_result(self) -> ApiResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::FieldErrors(self))
        }
    }
}

/// `{"message": "..."}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `{"errors": {"field": "message"}}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorsResponse {
    pub errors: FieldErrors,
}

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("bad request: {0}")]
    InvalidInput(String),
    #[error("validation failed on {} field(s)", .0.len())]
    FieldErrors(FieldErrors),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("internal server error")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::FieldErrors(_) => "VALIDATION",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    /// The one place error kinds become HTTP statuses.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) | ApiError::FieldErrors(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldErrors(FieldErrors::single(field, message))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        match self {
            ApiError::InvalidInput(message) | ApiError::NotFound(message) => {
                (status, Json(MessageResponse::new(message))).into_response()
            }
            ApiError::FieldErrors(errors) => {
                (status, Json(ErrorsResponse { errors })).into_response()
            }
            ApiError::Internal(err) => {
                error!(code, "request failed: {err:#}");
                (status, Json(MessageResponse::new(INTERNAL_MESSAGE))).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn internal_errors_are_masked() {
        let err = ApiError::internal(anyhow::anyhow!("connection refused to 10.0.0.7"));
        assert_eq!(err.code(), "INTERNAL");
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "message": INTERNAL_MESSAGE }));
    }

    #[tokio::test]
    async fn field_errors_render_under_errors_key() {
        let mut errors = FieldErrors::new();
        errors.insert("salary", "first");
        errors.insert("salary", "Salary must be a number");
        errors.insert("name", "Name cannot be blank.");
        let (status, body) = render(ApiError::FieldErrors(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "errors": {
                "name": "Name cannot be blank.",
                "salary": "Salary must be a number"
            }})
        );
    }

    #[tokio::test]
    async fn not_found_and_invalid_input_use_message_shape() {
        let (status, body) = render(ApiError::NotFound("Gone.".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Gone." }));

        let (status, body) = render(ApiError::InvalidInput("Bad.".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "message": "Bad." }));
    }

    #[test]
    fn empty_field_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
        let err = FieldErrors::single("id", "bad").into_result().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
