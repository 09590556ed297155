//! In-memory history implementation for testing.

use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AcceptedPosting, RunStamp};

use super::HistoryStore;

/// History backed by plain vectors.
///
/// Mirrors the file store's observable behavior without touching disk. Not
/// suitable for production as data is lost on drop.
#[derive(Default)]
pub struct MemoryHistory {
    records: RwLock<Vec<AcceptedPosting>>,
    runs: RwLock<Vec<RunStamp>>,
}

impl MemoryHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn record_count(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Number of runs appended.
    pub fn run_count(&self) -> usize {
        self.runs.read().unwrap().len()
    }

    /// Snapshot of the stored records.
    pub fn records(&self) -> Vec<AcceptedPosting> {
        self.records.read().unwrap().clone()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn read_existing_urls(&self) -> Result<HashSet<String>> {
        Ok(self
            .records
            .read()
            .unwrap()
            .iter()
            .map(|record| record.posting.url.clone())
            .collect())
    }

    async fn append_run(&self, stamp: &RunStamp, postings: &[AcceptedPosting]) -> Result<()> {
        self.runs.write().unwrap().push(stamp.clone());
        self.records
            .write()
            .unwrap()
            .extend(postings.iter().cloned());
        Ok(())
    }

    async fn remove_url(&self, url: &str) -> Result<usize> {
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|record| record.posting.url != url);
        Ok(before - records.len())
    }

    async fn remove_company(&self, company: &str) -> Result<usize> {
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|record| record.posting.company != company);
        Ok(before - records.len())
    }
}
