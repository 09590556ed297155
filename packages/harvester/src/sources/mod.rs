//! Board clients, one adapter per upstream job board.
//!
//! Each adapter paginates its board from offset zero until exhaustion, the
//! result cap, or a failed page, and maps the board's wire format into
//! [`RawPosting`]s. Adapters are independent: one board failing never blocks
//! another, and a failure after the first page returns the partial batch
//! instead of discarding it.

mod indeed;
mod linkedin;
mod skillsire;

pub use indeed::IndeedSource;
pub use linkedin::LinkedinSource;
pub use skillsire::SkillsireSource;

use async_trait::async_trait;

use crate::config::{BoardId, RunConfig};
use crate::error::SourceResult;
use crate::stop::StopSignal;
use crate::types::SourceBatch;

/// What to ask a board for.
#[derive(Debug, Clone)]
pub struct SourceQuery {
    /// Free-text search term.
    pub search_term: String,
    /// Country the board should scope results to.
    pub country: String,
    /// Maximum posting age, in hours. Boards encode this in their own
    /// lookback vocabulary.
    pub lookback_hours: u32,
    /// Stop paginating once this many postings have been collected.
    pub max_results: usize,
}

impl SourceQuery {
    /// Query derived from a run's configuration.
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            search_term: config.search_term.clone(),
            country: config.country_to_search.clone(),
            lookback_hours: config.hours,
            max_results: config.results_fetch_count,
        }
    }
}

/// A job board client.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Board id; matches the ids used in `scrape_from`.
    fn name(&self) -> &str;

    /// Fetch postings matching `query`.
    ///
    /// The stop signal is consulted before each page request; once observed,
    /// no further page is fetched and the partial batch is returned.
    async fn fetch(&self, query: &SourceQuery, stop: &StopSignal) -> SourceResult<SourceBatch>;
}

/// Build the adapter set for a run's enabled boards, in `scrape_from` order.
pub fn build_sources(config: &RunConfig) -> SourceResult<Vec<Box<dyn JobSource>>> {
    config.boards().into_iter().map(source_for).collect()
}

/// Adapter for one board id.
pub fn source_for(board: BoardId) -> SourceResult<Box<dyn JobSource>> {
    Ok(match board {
        BoardId::Linkedin => Box::new(LinkedinSource::new()?),
        BoardId::Indeed => Box::new(IndeedSource::new()?),
        BoardId::Skillsire => Box::new(SkillsireSource::new()?),
    })
}
