//! Test doubles for pipeline scenarios.
//!
//! These back the integration tests and are useful for wiring the pipeline
//! in downstream test harnesses without touching real boards.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{HarvestError, Result, SourceError, SourceResult};
use crate::notify::Notifier;
use crate::sources::{JobSource, SourceQuery};
use crate::stop::StopSignal;
use crate::types::{AcceptedPosting, RawPosting, SourceBatch};

/// A board source returning predefined postings.
pub struct MockSource {
    name: String,
    postings: Vec<RawPosting>,
    fail: bool,
    truncated: bool,
    calls: Arc<Mutex<usize>>,
}

impl MockSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            postings: Vec::new(),
            fail: false,
            truncated: false,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Add a posting this source will return.
    pub fn with_posting(mut self, posting: RawPosting) -> Self {
        self.postings.push(posting);
        self
    }

    /// Add a posting with just a URL and title.
    pub fn with_job(self, url: &str, title: &str) -> Self {
        self.with_posting(RawPosting::new().with_url(url).with_title(title))
    }

    /// Make every fetch fail with a connection error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Mark returned batches as possibly truncated.
    pub fn truncated(mut self) -> Self {
        self.truncated = true;
        self
    }

    /// Shared fetch counter; clone before boxing the source.
    pub fn calls_handle(&self) -> Arc<Mutex<usize>> {
        self.calls.clone()
    }
}

#[async_trait]
impl JobSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, query: &SourceQuery, _stop: &StopSignal) -> SourceResult<SourceBatch> {
        *self.calls.lock().unwrap() += 1;

        if self.fail {
            return Err(SourceError::Http(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "mock connection refused",
            ))));
        }

        let postings: Vec<RawPosting> = self
            .postings
            .iter()
            .take(query.max_results)
            .cloned()
            .collect();
        Ok(SourceBatch {
            postings,
            possibly_truncated: self.truncated,
        })
    }
}

/// Notifier recording every delivery for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    deliveries: Arc<Mutex<Vec<Vec<AcceptedPosting>>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the delivery, then fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Deliveries observed so far, one entry per notified run.
    pub fn deliveries(&self) -> Vec<Vec<AcceptedPosting>> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_new_postings(&self, postings: &[AcceptedPosting]) -> Result<()> {
        self.deliveries.lock().unwrap().push(postings.to_vec());
        if self.fail {
            return Err(HarvestError::Notify(Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "mock notifier failure",
            ))));
        }
        Ok(())
    }
}
