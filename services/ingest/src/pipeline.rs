//! Parse, normalize and persist a staged CSV file
//!
//! The staged file is removed after a successful persist. Under
//! [`CleanupPolicy::Always`] it is removed on failure as well; otherwise a
//! failed file stays for inspection until the sweeper reclaims it.

use std::{collections::BTreeMap, path::Path, sync::Arc};

use common::config::CleanupPolicy;
use serde::Serialize;
use tokio::fs;
use tracing::{error, info, warn};

use crate::current_year;
use crate::error::IngestError;
use crate::normalize::{NormalizedCar, normalize_row};
use crate::parser::parse_rows;
use crate::repositories::CarStore;

/// Outcome of a successful import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub inserted: u64,
    /// Rows where at least one field fell back to its default
    pub rows_with_defaults: usize,
    /// How many rows defaulted each field
    pub defaulted_fields: BTreeMap<&'static str, usize>,
}

impl IngestReport {
    fn tally(rows: &[NormalizedCar]) -> Self {
        let mut report = IngestReport::default();
        for row in rows {
            if !row.defaulted.is_empty() {
                report.rows_with_defaults += 1;
            }
            for field in &row.defaulted {
                *report.defaulted_fields.entry(*field).or_default() += 1;
            }
        }
        report
    }
}

#[derive(Clone)]
pub struct Ingestor {
    cars: Arc<dyn CarStore>,
    cleanup: CleanupPolicy,
}

impl Ingestor {
    pub fn new(cars: Arc<dyn CarStore>, cleanup: CleanupPolicy) -> Self {
        Self { cars, cleanup }
    }

    /// Import a staged CSV file, returning what was stored
    pub async fn ingest(&self, staged_path: &Path) -> Result<IngestReport, IngestError> {
        let result = self.run(staged_path).await;

        match (&result, self.cleanup) {
            (Ok(_), _) | (Err(_), CleanupPolicy::Always) => remove_staged(staged_path).await,
            (Err(e), CleanupPolicy::OnSuccess) => {
                warn!(
                    "Keeping staged file {} after failed import: {}",
                    staged_path.display(),
                    e
                );
            }
        }

        result
    }

    async fn run(&self, staged_path: &Path) -> Result<IngestReport, IngestError> {
        info!("Reading CSV file from {}", staged_path.display());
        let data = fs::read(staged_path).await?;

        let year = current_year();
        let rows = tokio::task::spawn_blocking(move || -> Result<Vec<NormalizedCar>, csv::Error> {
            Ok(parse_rows(&data)?
                .iter()
                .map(|raw| normalize_row(raw, year))
                .collect())
        })
        .await
        .map_err(|e| IngestError::Io(std::io::Error::other(e)))??;

        if rows.is_empty() {
            return Err(IngestError::EmptyFile);
        }
        info!("Parsed {} car rows", rows.len());

        let mut report = IngestReport::tally(&rows);
        let cars: Vec<_> = rows.into_iter().map(|row| row.car).collect();
        report.inserted = self.cars.insert_many(&cars).await?;

        info!(
            "Imported {} cars, {} with defaulted fields {:?}",
            report.inserted, report.rows_with_defaults, report.defaulted_fields
        );
        Ok(report)
    }
}

async fn remove_staged(path: &Path) {
    // A leftover file is reclaimed by the sweeper
    if let Err(e) = fs::remove_file(path).await {
        error!("Failed to remove staged file {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SpareKey, Transmission};
    use crate::repositories::MemoryCarStore;

    const HEADER: &str = "model_name,price,manufacturing_year,engine_capacity,spare_key,transmission,km_driven,ownership,fuel_type,imperfections,repainted_parts";

    fn write_csv(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn ingestor(cleanup: CleanupPolicy) -> (Ingestor, Arc<MemoryCarStore>) {
        let store = Arc::new(MemoryCarStore::default());
        (Ingestor::new(store.clone(), cleanup), store)
    }

    #[tokio::test]
    async fn test_inserted_count_matches_rows_and_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "cars.csv",
            &format!(
                "{HEADER}\n\
                 Toyota Camry,2500000,2020,2487 cc,Yes,Automatic,32000,First Owner,Petrol,None,None\n\
                 Maruti Swift,550000,2017,1197 cc,No,Manual,61000,Second Owner,Petrol,Scratches,Door\n\
                 Hyundai Creta,1400000,2021,1497 cc,Yes,Automatic,18000,First Owner,Diesel,None,None\n"
            ),
        );
        let (ingestor, store) = ingestor(CleanupPolicy::OnSuccess);

        let report = ingestor.ingest(&path).await.unwrap();

        assert_eq!(report.inserted, 3);
        assert_eq!(report.rows_with_defaults, 0);
        let cars = store.list_all().await.unwrap();
        assert_eq!(cars.len(), 3);
        assert!(
            cars.iter()
                .all(|c| c.price.is_finite() && c.price >= 0.0 && c.km_driven >= 0.0)
        );
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_blank_row_is_stored_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "mixed.csv",
            &format!(
                "{HEADER}\n\
                 Toyota Camry,2500000,2020,2487 cc,Yes,Automatic,32000,First Owner,Petrol,None,None\n\
                 ,,,,,,,,,,\n"
            ),
        );
        let (ingestor, store) = ingestor(CleanupPolicy::OnSuccess);

        let report = ingestor.ingest(&path).await.unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.rows_with_defaults, 1);
        assert_eq!(report.defaulted_fields.get("price"), Some(&1));

        let cars = store.list_all().await.unwrap();
        let blank = &cars[1];
        assert_eq!(blank.model_name, "Unknown Model");
        assert_eq!(blank.price, 0.0);
        assert_eq!(blank.manufacturing_year, current_year());
        assert_eq!(blank.transmission, Transmission::Manual);
        assert_eq!(blank.fuel_type, "Petrol");
        assert_eq!(blank.spare_key, SpareKey::No);
        assert_eq!(cars[0].model_name, "Toyota Camry");
    }

    #[tokio::test]
    async fn test_missing_columns_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "partial.csv", "model_name,km_driven\nAlto,12000\n");
        let (ingestor, store) = ingestor(CleanupPolicy::OnSuccess);

        ingestor.ingest(&path).await.unwrap();

        let cars = store.list_all().await.unwrap();
        assert_eq!(cars[0].price, 0.0);
        assert_eq!(cars[0].manufacturing_year, current_year());
        assert_eq!(cars[0].km_driven, 12000.0);
    }

    #[tokio::test]
    async fn test_importing_twice_doubles_the_records() {
        let dir = tempfile::tempdir().unwrap();
        let body =
            format!("{HEADER}\nAlto,300000,2015,796 cc,No,Manual,70000,First Owner,CNG,None,None\n");
        let (ingestor, store) = ingestor(CleanupPolicy::OnSuccess);

        let first = write_csv(dir.path(), "first.csv", &body);
        ingestor.ingest(&first).await.unwrap();
        let second = write_csv(dir.path(), "second.csv", &body);
        ingestor.ingest(&second).await.unwrap();

        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_header_only_file_is_empty_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "empty.csv", &format!("{HEADER}\n"));
        let (ingestor, store) = ingestor(CleanupPolicy::OnSuccess);

        let result = ingestor.ingest(&path).await;

        assert!(matches!(result, Err(IngestError::EmptyFile)));
        assert!(store.list_all().await.unwrap().is_empty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_always_policy_removes_failed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "empty.csv", &format!("{HEADER}\n"));
        let (ingestor, _) = ingestor(CleanupPolicy::Always);

        assert!(ingestor.ingest(&path).await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_out_of_range_year_falls_back_to_current_year() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "typo.csv",
            "model_name,manufacturing_year\nGood,2019\nTypo,20190\nAncient,1700\n",
        );
        let (ingestor, store) = ingestor(CleanupPolicy::OnSuccess);

        let report = ingestor.ingest(&path).await.unwrap();

        assert_eq!(report.inserted, 3);
        assert_eq!(report.defaulted_fields.get("manufacturing_year"), Some(&2));
        let cars = store.list_all().await.unwrap();
        assert_eq!(cars[0].manufacturing_year, 2019);
        assert_eq!(cars[1].manufacturing_year, current_year());
        assert_eq!(cars[2].manufacturing_year, current_year());
    }

    #[tokio::test]
    async fn test_malformed_bytes_are_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("binary.csv");
        let mut data = format!("{HEADER}\n").into_bytes();
        data.extend_from_slice(&[0xc3, 0x28, b'\n']);
        std::fs::write(&path, data).unwrap();
        let (ingestor, _) = ingestor(CleanupPolicy::OnSuccess);

        assert!(matches!(
            ingestor.ingest(&path).await,
            Err(IngestError::Parse(_))
        ));
    }
}
