//! One harvest invocation: fetch, normalize, filter, reconcile, append.

use tracing::{info, warn};

use crate::config::RunConfig;
use crate::error::Result;
use crate::filter::filter_by_roles;
use crate::normalize::normalize_batch;
use crate::notify::Notifier;
use crate::reconcile::reconcile;
use crate::snapshot::DeltaSnapshot;
use crate::sources::{JobSource, SourceQuery};
use crate::stop::StopSignal;
use crate::store::HistoryStore;
use crate::types::{RawPosting, RunStamp};

/// Outcome of one run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Raw postings fetched across all boards.
    pub fetched: usize,
    /// Postings surviving normalization and the role filter.
    pub matched: usize,
    /// Genuinely new postings appended to the history.
    pub new_postings: usize,
    /// Boards whose fetch failed outright this run.
    pub failed_sources: Vec<String>,
    /// True when any board stopped at the result cap with more possibly
    /// available upstream.
    pub possibly_truncated: bool,
    /// True when the stop signal ended the run before every board finished.
    pub stopped_early: bool,
}

impl RunReport {
    /// True when every board was fetched to completion.
    pub fn is_complete(&self) -> bool {
        self.failed_sources.is_empty() && !self.stopped_early
    }
}

/// Execute one harvest run against `sources` and `store`.
///
/// Board failures, malformed records, a degraded dedup read, and snapshot or
/// notifier trouble are all recovered and surfaced through the report or the
/// log; only a failed history store operation aborts the run. With no new
/// postings the store is left untouched, which is what makes repeated runs
/// idempotent.
pub async fn run_once<S, N>(
    config: &RunConfig,
    sources: &[Box<dyn JobSource>],
    store: &S,
    snapshot: Option<&DeltaSnapshot>,
    notifier: &N,
    stop: &StopSignal,
) -> Result<RunReport>
where
    S: HistoryStore + ?Sized,
    N: Notifier + ?Sized,
{
    let stamp = RunStamp::now();
    let query = SourceQuery::from_config(config);
    let mut report = RunReport::default();

    info!(
        search_term = %config.search_term,
        boards = sources.len(),
        lookback_hours = config.hours,
        "Starting harvest run"
    );

    // Boards are independent, so fetches run concurrently. The stop signal
    // gates each board here and every pagination page inside the adapters.
    let fetches = sources.iter().map(|source| {
        let query = &query;
        async move {
            if stop.is_stopped() {
                return (source.name(), None);
            }
            (source.name(), Some(source.fetch(query, stop).await))
        }
    });
    let outcomes = futures::future::join_all(fetches).await;

    let mut raw: Vec<RawPosting> = Vec::new();
    for (name, outcome) in outcomes {
        match outcome {
            None => report.stopped_early = true,
            Some(Ok(batch)) => {
                info!(
                    board = name,
                    fetched = batch.postings.len(),
                    truncated = batch.possibly_truncated,
                    "Board fetch complete"
                );
                report.possibly_truncated |= batch.possibly_truncated;
                raw.extend(batch.postings);
            }
            Some(Err(e)) => {
                warn!(board = name, error = %e, "Board fetch failed, continuing without it");
                report.failed_sources.push(name.to_string());
            }
        }
    }
    if stop.is_stopped() {
        report.stopped_early = true;
    }
    report.fetched = raw.len();

    let matched = filter_by_roles(normalize_batch(raw), &config.roles_of_interest);
    report.matched = matched.len();

    let existing = store.read_existing_urls().await?;
    let delta = reconcile(matched, &existing);
    report.new_postings = delta.len();

    if delta.is_empty() {
        info!(fetched = report.fetched, "No new postings this run");
        return Ok(report);
    }

    let accepted: Vec<_> = delta
        .into_iter()
        .map(|posting| posting.accepted_at(&stamp))
        .collect();
    store.append_run(&stamp, &accepted).await?;
    info!(appended = accepted.len(), "Appended new postings to history");

    if let Some(snapshot) = snapshot {
        if let Err(e) = snapshot.write(&accepted).await {
            warn!(error = %e, "Failed to write delta snapshot");
        }
    }
    if let Err(e) = notifier.notify_new_postings(&accepted).await {
        warn!(error = %e, "Notification failed; postings are already recorded");
    }

    Ok(report)
}
