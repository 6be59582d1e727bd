//! Multipart intake for the CSV endpoints
//!
//! Exactly one `file` field is read. Its declared name and type are checked
//! before any bytes are consumed, and the body is read chunk by chunk so an
//! oversized upload is rejected as soon as it crosses the limit.

use axum::{
    extract::{
        Multipart,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
};
use ingest::{StagedUpload, Stager, StagingError};
use tracing::debug;

use crate::error::{ApiError, ApiResult};

/// Multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

struct Received {
    filename: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

fn multipart_error(e: MultipartError, stager: &Stager) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StagingError::TooLarge {
            limit: stager.max_bytes(),
        }
        .into()
    } else {
        ApiError::BadRequest(format!("Failed to read multipart: {}", e.body_text()))
    }
}

async fn read_field(stager: &Stager, mut field: Field<'_>) -> ApiResult<Received> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    stager.check_type(&filename, content_type.as_deref())?;

    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, stager))?
    {
        data.extend_from_slice(&chunk);
        stager.check_size(data.len())?;
    }

    debug!("Received {} bytes for {:?}", data.len(), filename);
    Ok(Received {
        filename,
        content_type,
        data,
    })
}

/// Read the `file` field and write it to the staging directory
pub async fn receive_csv(stager: &Stager, mut multipart: Multipart) -> ApiResult<StagedUpload> {
    let mut received = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, stager))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if received.is_some() {
            return Err(ApiError::BadRequest(
                "Send exactly one field named 'file'".to_string(),
            ));
        }
        received = Some(read_field(stager, field).await?);
    }

    let received = received.ok_or(StagingError::NoFile)?;
    let staged = stager
        .stage(
            &received.filename,
            received.content_type.as_deref(),
            &received.data,
        )
        .await?;

    Ok(staged)
}
