//! Upload staging
//!
//! Accepted uploads are written under the staging directory as
//! `csv-<unix-millis>-<8 hex><ext>`. The stager never deletes what it
//! writes; that is left to the pipeline and the sweeper.

use std::path::{Path, PathBuf};

use chrono::Utc;
use common::config::UploadConfig;
use serde::Serialize;
use tokio::{fs, io::AsyncWriteExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::StagingError;

pub const CSV_MIME_TYPE: &str = "text/csv";

/// Prefix shared by every staged file name
pub const STAGED_PREFIX: &str = "csv-";

/// A file written to the staging directory, pending processing
#[derive(Debug, Clone, Serialize)]
pub struct StagedUpload {
    pub original_filename: String,
    pub storage_path: PathBuf,
    pub size_bytes: u64,
    pub mime_type: String,
}

impl StagedUpload {
    /// Name of the staged file inside the staging directory
    pub fn filename(&self) -> String {
        self.storage_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Writes accepted uploads to the staging directory
#[derive(Debug, Clone)]
pub struct Stager {
    staging_dir: PathBuf,
    max_bytes: usize,
}

impl Stager {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            staging_dir: config.staging_dir.clone(),
            max_bytes: config.max_bytes,
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Whether a declared file looks like CSV, by MIME type or by name
    pub fn accepts(filename: &str, mime_type: Option<&str>) -> bool {
        let declared_csv = mime_type
            .and_then(|m| m.split(';').next())
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(CSV_MIME_TYPE));

        declared_csv || filename.to_ascii_lowercase().ends_with(".csv")
    }

    /// Reject a declared upload before any of its bytes are read
    pub fn check_type(&self, filename: &str, mime_type: Option<&str>) -> Result<(), StagingError> {
        if Self::accepts(filename, mime_type) {
            Ok(())
        } else {
            warn!("Rejected upload {:?} with type {:?}", filename, mime_type);
            Err(StagingError::UnsupportedType)
        }
    }

    /// Reject a payload that has grown past the size limit
    pub fn check_size(&self, size: usize) -> Result<(), StagingError> {
        if size > self.max_bytes {
            warn!("Rejected upload of {} bytes", size);
            Err(StagingError::TooLarge {
                limit: self.max_bytes,
            })
        } else {
            Ok(())
        }
    }

    /// Unique staged name keeping the original extension
    pub fn staged_name(original_filename: &str) -> String {
        let extension = Path::new(original_filename)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        let suffix = Uuid::new_v4().simple().to_string();

        format!(
            "{}{}-{}{}",
            STAGED_PREFIX,
            Utc::now().timestamp_millis(),
            &suffix[..8],
            extension
        )
    }

    /// Write an upload to the staging directory, creating it if needed
    pub async fn stage(
        &self,
        original_filename: &str,
        mime_type: Option<&str>,
        data: &[u8],
    ) -> Result<StagedUpload, StagingError> {
        self.check_type(original_filename, mime_type)?;
        self.check_size(data.len())?;

        fs::create_dir_all(&self.staging_dir).await?;
        let storage_path = self.staging_dir.join(Self::staged_name(original_filename));

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&storage_path)
            .await?;
        file.write_all(data).await?;
        file.flush().await?;

        info!(
            "Staged upload {:?} at {} ({} bytes)",
            original_filename,
            storage_path.display(),
            data.len()
        );

        Ok(StagedUpload {
            original_filename: original_filename.to_string(),
            storage_path,
            size_bytes: data.len() as u64,
            mime_type: mime_type.unwrap_or(CSV_MIME_TYPE).to_string(),
        })
    }
}
