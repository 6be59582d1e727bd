//! Error types for staging, ingestion and the record store

use std::io;

use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

/// Rejections raised while receiving an upload
#[derive(Error, Debug)]
pub enum StagingError {
    #[error("No file uploaded or file is not a CSV.")]
    NoFile,

    #[error("Only CSV files are allowed")]
    UnsupportedType,

    #[error("File exceeds the {limit} byte upload limit")]
    TooLarge { limit: usize },

    #[error("Failed to stage upload: {0}")]
    Io(#[from] io::Error),
}

/// Record store failures
#[derive(Error, Debug)]
pub enum StoreError {
    /// A record does not have the shape of a car
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),
}

/// Failures of the parse, normalize and persist pipeline
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Malformed CSV: {0}")]
    Parse(#[from] csv::Error),

    /// The file parsed but held no data rows
    #[error("CSV file is empty or invalid.")]
    EmptyFile,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to read staged file: {0}")]
    Io(#[from] io::Error),
}

/// Failures starting the staging sweeper
#[derive(Error, Debug)]
pub enum SweeperError {
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),
}
