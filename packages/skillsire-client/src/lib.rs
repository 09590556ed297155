//! Pure Skillsire job search API client.
//!
//! A minimal client for the Skillsire all-jobs search endpoint. Supports
//! offset pagination, a caller-supplied result cap, and the API's
//! posted-within buckets.
//!
//! # Example
//!
//! ```rust,ignore
//! use skillsire_client::{PostedWithin, SearchParams, SkillsireClient};
//!
//! let client = SkillsireClient::new()?;
//! let params = SearchParams::country("India", "in", "machine learning engineer")
//!     .posted_within(PostedWithin::OneHour);
//!
//! let batch = client.search_jobs(&params, 300, || false).await?;
//! for job in &batch.jobs {
//!     println!("{}", SkillsireClient::job_url(&job.job_id));
//! }
//! ```

pub mod error;
pub mod types;

pub use error::{Result, SkillsireError};
pub use types::{
    JobBatch, JobLocation, JobSearchRequest, JobsResponse, PostedWithin, SearchParams,
    SkillsireJob,
};

use std::time::Duration;

const BASE_URL: &str = "https://www.skillsire.com";

/// Jobs per page returned by the all-jobs endpoint.
const PAGE_SIZE: usize = 20;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SkillsireClient {
    client: reqwest::Client,
    base_url: String,
}

impl SkillsireClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    /// Client pointed at an alternate base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Public listing-page URL for a job id. Stable across sessions, which
    /// makes it usable as an identity for the posting.
    pub fn job_url(job_id: &str) -> String {
        format!("{BASE_URL}/job/jobs-enlisting/all-jobs?jobId={job_id}")
    }

    /// Fetch one page of results at `offset`.
    pub async fn fetch_page(&self, params: &SearchParams, offset: usize) -> Result<JobsResponse> {
        let url = format!("{}/api/job/all-jobs", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&params.to_request(offset))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SkillsireError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp.json().await?)
    }

    /// Search jobs, paginating until the results are exhausted or
    /// `max_results` have been collected.
    ///
    /// `should_stop` is consulted before each page request; once it returns
    /// true no further page is fetched and whatever was collected so far is
    /// returned. A failed page after the first also ends pagination with the
    /// partial batch rather than discarding it.
    pub async fn search_jobs<F>(
        &self,
        params: &SearchParams,
        max_results: usize,
        mut should_stop: F,
    ) -> Result<JobBatch>
    where
        F: FnMut() -> bool + Send,
    {
        let mut jobs: Vec<SkillsireJob> = Vec::new();
        let mut offset = 0;
        let mut possibly_truncated = false;

        loop {
            if should_stop() {
                tracing::debug!(collected = jobs.len(), "Stop requested, ending pagination");
                break;
            }

            let page = match self.fetch_page(params, offset).await {
                Ok(page) => page,
                Err(e) if jobs.is_empty() => return Err(e),
                Err(e) => {
                    tracing::warn!(offset, error = %e, "Page fetch failed, returning partial results");
                    break;
                }
            };

            let page_len = page.jobs.len();
            let reported = page.meta.result_count;
            jobs.extend(page.jobs);
            tracing::debug!(
                fetched = page_len,
                offset,
                collected = jobs.len(),
                reported,
                "Fetched jobs page"
            );

            if page_len == 0 {
                break;
            }
            // The API caps the usable total at whichever is smaller: what it
            // reports for the query, or what the caller asked for.
            let target = reported.min(max_results);
            if jobs.len() >= target {
                // Stopping at the cap is ambiguous: the reported count may
                // itself be capped, so more results could exist upstream.
                possibly_truncated = jobs.len() >= max_results && reported >= max_results;
                break;
            }
            offset += PAGE_SIZE;
        }

        Ok(JobBatch {
            jobs,
            possibly_truncated,
        })
    }
}
