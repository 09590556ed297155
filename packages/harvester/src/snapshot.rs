//! Delta snapshot for collaborators that only want the latest run's output.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{HarvestError, Result};
use crate::types::AcceptedPosting;

/// JSON file holding the most recent run's accepted postings.
///
/// Overwritten wholesale on every run that found something new, so consumers
/// read the latest delta without parsing the full history.
pub struct DeltaSnapshot {
    path: PathBuf,
}

impl DeltaSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the snapshot with this run's postings.
    pub async fn write(&self, postings: &[AcceptedPosting]) -> Result<()> {
        let body = serde_json::to_vec(postings)?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| HarvestError::store(&self.path, e))?;
        debug!(path = %self.path.display(), count = postings.len(), "Wrote delta snapshot");
        Ok(())
    }
}
