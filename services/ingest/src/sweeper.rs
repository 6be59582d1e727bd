//! Scheduled removal of stale staged uploads
//!
//! Files from failed imports and from `/api/csv/upload` are never processed,
//! so a cron job deletes anything in the staging directory older than the
//! configured age.

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use common::config::UploadConfig;
use tokio::fs;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info, warn};

use crate::error::SweeperError;
use crate::staging::STAGED_PREFIX;

#[derive(Debug, Clone)]
pub struct StagingSweeper {
    staging_dir: PathBuf,
    stale_after: Duration,
}

impl StagingSweeper {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            staging_dir: config.staging_dir.clone(),
            stale_after: Duration::from_secs(config.stale_after_secs),
        }
    }

    /// Delete staged files older than the configured age, returning how many
    ///
    /// A file that cannot be inspected or removed is logged and skipped.
    pub async fn sweep(&self) -> std::io::Result<usize> {
        let mut entries = match fs::read_dir(&self.staging_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut staged = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_name().to_string_lossy().starts_with(STAGED_PREFIX) {
                staged.push(entry.path());
            }
        }

        Ok(self.remove_stale(&staged).await)
    }

    async fn remove_stale(&self, paths: &[PathBuf]) -> usize {
        let mut removed = 0;
        for path in paths {
            match self.remove_if_stale(path).await {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Staged file {} already gone", path.display());
                }
                Err(e) => warn!("Could not sweep {}: {}", path.display(), e),
            }
        }
        removed
    }

    async fn remove_if_stale(&self, path: &Path) -> std::io::Result<bool> {
        let metadata = fs::symlink_metadata(path).await?;
        if !metadata.is_file() {
            return Ok(false);
        }

        let age = metadata.modified()?.elapsed().unwrap_or_default();
        if age < self.stale_after {
            return Ok(false);
        }

        debug!("Sweeping stale staged file {}", path.display());
        fs::remove_file(path).await?;
        Ok(true)
    }

    /// Run [`sweep`](Self::sweep) on a cron schedule
    ///
    /// The returned scheduler must be kept alive for the job to keep firing.
    pub async fn start(&self, schedule: &str) -> Result<JobScheduler, SweeperError> {
        let sweeper = self.clone();
        let scheduler = JobScheduler::new().await?;

        let job = Job::new_async(schedule, move |_, _| {
            let sweeper = sweeper.clone();
            Box::pin(async move {
                match sweeper.sweep().await {
                    Ok(0) => debug!("Staging sweep found nothing stale"),
                    Ok(removed) => info!("Staging sweep removed {} files", removed),
                    Err(e) => error!("Staging sweep failed: {}", e),
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;

        info!(
            "Started staging sweeper for {} with schedule: {}",
            self.staging_dir.display(),
            schedule
        );
        Ok(scheduler)
    }
}
