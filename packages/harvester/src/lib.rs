//! Incremental Job Posting Harvester
//!
//! A reconciliation pipeline that fetches recent job postings from multiple
//! boards, filters them against role-of-interest keywords, deduplicates them
//! against the recorded history, and appends only the genuinely new postings
//! to an append-only CSV ledger.
//!
//! # Design Philosophy
//!
//! - The posting URL is the identity; the history never holds it twice
//! - Runs are idempotent: no new upstream data, no new rows
//! - One board failing never blocks the others
//! - The ledger only ever grows during a run; deletes are explicit
//!   collaborator operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//!
//! use harvester::{build_sources, run_once, CsvHistory, NoopNotifier, RunConfig, StopSignal};
//!
//! let config = RunConfig::load(Path::new("scraper_settings.json"))?;
//! let sources = build_sources(&config)?;
//! let store = CsvHistory::open("jobs_main.csv").await?;
//! let stop = StopSignal::with_sentinel("STOP_SCRAPE");
//!
//! let report = run_once(&config, &sources, &store, None, &NoopNotifier, &stop).await?;
//! println!("{} new postings", report.new_postings);
//! ```
//!
//! # Modules
//!
//! - [`sources`] - Board clients (LinkedIn, Indeed, Skillsire)
//! - [`normalize`] / [`filter`] / [`reconcile`] - The pure pipeline stages
//! - [`store`] - The append-only history ledger
//! - [`pipeline`] - Run orchestration
//! - [`testing`] - Mock implementations for tests

pub mod config;
pub mod error;
pub mod filter;
pub mod normalize;
pub mod notify;
pub mod pipeline;
pub mod reconcile;
pub mod snapshot;
pub mod sources;
pub mod stop;
pub mod store;
pub mod testing;
pub mod types;

// Re-export core types at crate root
pub use config::{BoardId, RunConfig};
pub use error::{HarvestError, Result, SourceError, SourceResult};
pub use notify::{Notifier, NoopNotifier};
pub use pipeline::{run_once, RunReport};
pub use snapshot::DeltaSnapshot;
pub use sources::{
    build_sources, source_for, IndeedSource, JobSource, LinkedinSource, SkillsireSource,
    SourceQuery,
};
pub use stop::StopSignal;
pub use store::{default_file_name, CsvHistory, HistoryStore, MemoryHistory};
pub use types::{AcceptedPosting, Posting, RawPosting, RunStamp, SourceBatch};

// Re-export testing utilities
pub use testing::{MockSource, RecordingNotifier};
