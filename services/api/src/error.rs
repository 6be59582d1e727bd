//! Request-boundary error mapping for the CSV endpoints

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ingest::{IngestError, StagingError, StoreError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed request that never reached the pipeline
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Upload(#[from] StagingError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Listing the record store failed
    #[error("Failed to fetch cars data: {0}")]
    FetchCars(StoreError),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Upload(StagingError::TooLarge { .. }) => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            ApiError::Upload(StagingError::Io(e)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to upload CSV file: {}", e),
            ),
            ApiError::Upload(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Ingest(IngestError::Parse(_) | IngestError::EmptyFile) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            ApiError::Ingest(IngestError::Store(e)) | ApiError::Store(e) => store_failure(e),
            ApiError::Ingest(IngestError::Io(e)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process CSV data: {}", e),
            ),
            ApiError::FetchCars(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        }
    }
}

fn store_failure(e: &StoreError) -> (StatusCode, String) {
    match e {
        StoreError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            format!("Data validation failed: {}", msg),
        ),
        StoreError::Database(db) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {}", db),
        ),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", message);
        }

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status(e: ApiError) -> StatusCode {
        e.into_response().status()
    }

    #[test]
    fn test_taxonomy_status_mapping() {
        assert_eq!(status(StagingError::NoFile.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(StagingError::UnsupportedType.into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(StagingError::TooLarge { limit: 1 }.into()),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(status(IngestError::EmptyFile.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(StoreError::Validation("price".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(IngestError::Store(StoreError::Database(sqlx::Error::PoolTimedOut)).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(ApiError::FetchCars(StoreError::Database(sqlx::Error::PoolClosed))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_messages_follow_the_wire_contract() {
        let (_, message) = ApiError::from(IngestError::EmptyFile).status_and_message();
        assert_eq!(message, "CSV file is empty or invalid.");

        let validation = StoreError::Validation("price must be a non-negative number".to_string());
        let (_, message) = ApiError::from(validation).status_and_message();
        assert_eq!(
            message,
            "Data validation failed: price must be a non-negative number"
        );

        let (_, message) = ApiError::from(StagingError::NoFile).status_and_message();
        assert_eq!(message, "No file uploaded or file is not a CSV.");
    }
}
