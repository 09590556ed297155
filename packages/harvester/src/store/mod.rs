//! Durable posting history.
//!
//! The history is the pipeline's one shared mutable resource: an append-only
//! record of every accepted posting, partitioned into runs by comment-style
//! separator lines. [`CsvHistory`] is the collaborator-facing file format;
//! [`MemoryHistory`] backs tests.

mod csv_ledger;
mod memory;

pub use csv_ledger::CsvHistory;
pub use memory::MemoryHistory;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Local, Timelike};

use crate::error::Result;
use crate::types::{AcceptedPosting, RunStamp};

/// Column order of a history record.
pub const COLUMNS: [&str; 6] = [
    "job_url",
    "title",
    "company",
    "location",
    "scrape_date",
    "scrape_time",
];

/// Append-only store of accepted postings.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// URLs of every posting currently recorded.
    ///
    /// When the record exists but carries no `job_url` column this degrades
    /// to an empty set with a logged warning, so the run proceeds without
    /// deduplication instead of failing.
    async fn read_existing_urls(&self) -> Result<HashSet<String>>;

    /// Append one run's delta: a separator line tagged with the run stamp,
    /// then one record per posting. Callers only invoke this for non-empty
    /// deltas, so a run that found nothing new leaves the record untouched.
    async fn append_run(&self, stamp: &RunStamp, postings: &[AcceptedPosting]) -> Result<()>;

    /// Drop every record with this URL. Returns how many were removed.
    async fn remove_url(&self, url: &str) -> Result<usize>;

    /// Drop every record whose company equals `company`. Returns how many
    /// were removed.
    async fn remove_company(&self, company: &str) -> Result<usize>;
}

/// Default ledger file name for a run started at `when`:
/// `jobs_{Month}_{day}_{bucket}.csv`, optionally prefixed, where the bucket
/// is the collaborator's time-of-day partitioning.
pub fn default_file_name(prefix: &str, when: DateTime<Local>) -> String {
    let bucket = match when.hour() {
        0..=8 => "overnight",
        9..=11 => "morning",
        12..=15 => "afternoon",
        16..=20 => "evening",
        _ => "night",
    };
    let name = format!("jobs_{}_{}_{}.csv", when.format("%B"), when.day(), bucket);
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}_{name}")
    }
}
