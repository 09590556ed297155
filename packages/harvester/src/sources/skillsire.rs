//! Skillsire board adapter.

use async_trait::async_trait;
use skillsire_client::{PostedWithin, SearchParams, SkillsireClient, SkillsireJob};

use crate::error::SourceResult;
use crate::stop::StopSignal;
use crate::types::{RawPosting, SourceBatch};

use super::{JobSource, SourceQuery};

/// Adapter over the Skillsire search API.
pub struct SkillsireSource {
    client: SkillsireClient,
    country_code: String,
}

impl SkillsireSource {
    pub fn new() -> SourceResult<Self> {
        Ok(Self {
            client: SkillsireClient::new()?,
            country_code: "in".to_string(),
        })
    }

    /// Override the two-letter market code sent alongside the country name.
    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = code.into();
        self
    }
}

#[async_trait]
impl JobSource for SkillsireSource {
    fn name(&self) -> &str {
        "skillsire"
    }

    async fn fetch(&self, query: &SourceQuery, stop: &StopSignal) -> SourceResult<SourceBatch> {
        let params = SearchParams::country(&query.country, &self.country_code, &query.search_term)
            .posted_within(PostedWithin::from_hours(query.lookback_hours));

        let batch = self
            .client
            .search_jobs(&params, query.max_results, || stop.is_stopped())
            .await?;

        Ok(SourceBatch {
            postings: batch.jobs.into_iter().map(to_raw).collect(),
            possibly_truncated: batch.possibly_truncated,
        })
    }
}

/// Map one Skillsire job into the pipeline's raw shape. The listing-page
/// deep link serves as the posting's identity.
fn to_raw(job: SkillsireJob) -> RawPosting {
    let mut raw = RawPosting::new().with_url(SkillsireClient::job_url(&job.job_id));
    if let Some(state) = job.primary_state() {
        raw = raw.with_location(state.to_string());
    }
    if let Some(title) = job.title {
        raw = raw.with_title(title);
    }
    if let Some(company) = job.company {
        raw = raw.with_company(company);
    }
    raw
}
