use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::domain::error::RepoError;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status: status.as_u16(), message: message.into() }
    }

    pub fn not_found() -> Self { Self::new(StatusCode::NOT_FOUND, "Not found") }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        let status = match &err {
            RepoError::NotFound => return Self::not_found(),
            RepoError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            RepoError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            RepoError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if err.is_cancellation() {
            tracing::warn!(error = %err, "request abandoned");
        } else {
            tracing::error!(error = %err, "store failure");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, axum::Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_errors_map_to_statuses() {
        assert_eq!(ApiError::from(RepoError::NotFound).status, 404);
        assert_eq!(ApiError::from(RepoError::Cancelled).status, 503);
        assert_eq!(ApiError::from(RepoError::DeadlineExceeded).status, 504);
        assert_eq!(ApiError::from(RepoError::Store(sqlx::Error::RowNotFound)).status, 500);
    }
}
