use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::users::repo::StoreError;

/// Error taxonomy for the directory API.
///
/// Clients only ever see `{"error": "<message>"}`; the underlying cause of an
/// `Unavailable` is logged, never returned.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("User not found")]
    NotFound,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Internal Server Error")]
    Unavailable(anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::DuplicateEmail,
            StoreError::Unavailable(e) => ApiError::Unavailable(e.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateEmail => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let ApiError::Unavailable(cause) = &self {
            error!(error = %cause, "store unavailable");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        let cases = [
            (ApiError::InvalidInput("missing email".into()), 400),
            (ApiError::DuplicateEmail, 409),
            (ApiError::NotFound, 404),
            (ApiError::InvalidCredentials, 401),
            (ApiError::Unavailable(anyhow::anyhow!("pool closed")), 500),
        ];
        for (err, code) in cases {
            assert_eq!(err.into_response().status().as_u16(), code);
        }
    }

    #[test]
    fn unavailable_message_hides_cause() {
        let err = ApiError::Unavailable(anyhow::anyhow!("connection refused to 10.0.0.1:5432"));
        assert_eq!(err.to_string(), "Internal Server Error");
    }
}
