//! CSV ingestion for car records
//!
//! An upload is staged by [`staging::Stager`], then [`pipeline::Ingestor`]
//! parses it, normalizes every row with fixed fallbacks and writes the batch
//! through a [`repositories::CarStore`]. [`sweeper::StagingSweeper`] reclaims
//! staged files that were never cleaned up.

use chrono::{Datelike, Utc};

pub mod error;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod pipeline;
pub mod repositories;
pub mod staging;
pub mod sweeper;
pub mod validation;

pub use error::{IngestError, StagingError, StoreError, SweeperError};
pub use models::{Car, CarInput, NewCar, NormalizeResult, SpareKey, Transmission};
pub use pipeline::{IngestReport, Ingestor};
pub use repositories::{CarRepository, CarStore};
pub use staging::{StagedUpload, Stager};
pub use sweeper::StagingSweeper;

/// Calendar year used as the manufacturing-year fallback and validation bound
pub fn current_year() -> i32 {
    Utc::now().year()
}
