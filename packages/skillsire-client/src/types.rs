use serde::{Deserialize, Serialize};

/// Posted-within windows supported by the Skillsire search API.
///
/// The API only understands two buckets, so any requested lookback has to be
/// mapped onto one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostedWithin {
    OneHour,
    OneDay,
}

impl PostedWithin {
    /// Map a lookback expressed in hours onto the nearest supported bucket.
    pub fn from_hours(hours: u32) -> Self {
        if hours > 1 {
            Self::OneDay
        } else {
            Self::OneHour
        }
    }

    /// Wire encoding of the bucket (the `dp` request field).
    pub fn as_param(self) -> &'static str {
        match self {
            Self::OneHour => "p1h",
            Self::OneDay => "p24h",
        }
    }
}

/// Search parameters for the all-jobs endpoint.
#[derive(Debug, Clone)]
pub struct SearchParams {
    pub location: String,
    pub country_code: String,
    pub query: String,
    pub posted_within: PostedWithin,
}

impl SearchParams {
    /// Country-scoped search for `query`.
    pub fn country(
        location: impl Into<String>,
        country_code: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            country_code: country_code.into(),
            query: query.into(),
            posted_within: PostedWithin::OneHour,
        }
    }

    pub fn posted_within(mut self, window: PostedWithin) -> Self {
        self.posted_within = window;
        self
    }

    /// Wire request for one page at `offset`.
    pub(crate) fn to_request(&self, offset: usize) -> JobSearchRequest {
        JobSearchRequest {
            loc: self.location.clone(),
            cc: self.country_code.clone(),
            scope: "country".to_string(),
            dp: self.posted_within.as_param().to_string(),
            query: self.query.clone(),
            offset,
        }
    }
}

/// Request body for the all-jobs endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct JobSearchRequest {
    pub loc: String,
    pub cc: String,
    #[serde(rename = "type")]
    pub scope: String,
    pub dp: String,
    pub query: String,
    pub offset: usize,
}

/// Response body of the all-jobs endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct JobsResponse {
    #[serde(default)]
    pub jobs: Vec<SkillsireJob>,
    #[serde(rename = "metaData", default)]
    pub meta: ResponseMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMeta {
    /// Total results the API claims to have for the query.
    #[serde(rename = "resultCount", default)]
    pub result_count: usize,
}

/// A single job from the all-jobs response.
#[derive(Debug, Clone, Deserialize)]
pub struct SkillsireJob {
    /// Listing id; the API serves it as either a JSON string or a number.
    #[serde(rename = "jobId", deserialize_with = "string_or_number")]
    pub job_id: String,
    #[serde(rename = "jobTitle", default)]
    pub title: Option<String>,
    #[serde(rename = "jobCompany", default)]
    pub company: Option<String>,
    #[serde(rename = "jobLocations", default)]
    pub locations: Vec<JobLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobLocation {
    #[serde(rename = "jobState", default)]
    pub state: Option<String>,
}

impl SkillsireJob {
    /// State of the first listed location, when the posting carries one.
    pub fn primary_state(&self) -> Option<&str> {
        self.locations.first().and_then(|loc| loc.state.as_deref())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

/// Accumulated result of a paginated search.
#[derive(Debug, Clone, Default)]
pub struct JobBatch {
    pub jobs: Vec<SkillsireJob>,
    /// True when pagination stopped at the caller's result cap while the API
    /// reported at least that many results. The batch may not cover
    /// everything available upstream.
    pub possibly_truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posted_within_maps_hours_onto_buckets() {
        assert_eq!(PostedWithin::from_hours(0), PostedWithin::OneHour);
        assert_eq!(PostedWithin::from_hours(1), PostedWithin::OneHour);
        assert_eq!(PostedWithin::from_hours(2), PostedWithin::OneDay);
        assert_eq!(PostedWithin::from_hours(24), PostedWithin::OneDay);
    }

    #[test]
    fn request_serializes_with_wire_field_names() {
        let params = SearchParams::country("India", "in", "machine learning engineer")
            .posted_within(PostedWithin::OneDay);
        let body = serde_json::to_value(params.to_request(40)).unwrap();

        assert_eq!(body["loc"], "India");
        assert_eq!(body["cc"], "in");
        assert_eq!(body["type"], "country");
        assert_eq!(body["dp"], "p24h");
        assert_eq!(body["query"], "machine learning engineer");
        assert_eq!(body["offset"], 40);
    }

    #[test]
    fn response_deserializes_from_api_shape() {
        let raw = r#"{
            "jobs": [
                {
                    "jobId": "8842",
                    "jobTitle": "Data Engineer",
                    "jobCompany": "Acme Analytics",
                    "jobLocations": [{"jobState": "Karnataka"}, {"jobState": "Remote"}]
                },
                {"jobId": "8843"}
            ],
            "metaData": {"resultCount": 57}
        }"#;

        let response: JobsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.meta.result_count, 57);
        assert_eq!(response.jobs.len(), 2);
        assert_eq!(response.jobs[0].primary_state(), Some("Karnataka"));
        assert_eq!(response.jobs[1].title, None);
        assert_eq!(response.jobs[1].primary_state(), None);
    }

    #[test]
    fn numeric_job_ids_read_as_strings() {
        let raw = r#"{
            "jobs": [
                {"jobId": 8842, "jobTitle": "Data Engineer"},
                {"jobId": "8843", "jobTitle": "ML Engineer"}
            ],
            "metaData": {"resultCount": 2}
        }"#;

        let response: JobsResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.jobs[0].job_id, "8842");
        assert_eq!(response.jobs[1].job_id, "8843");
    }

    #[test]
    fn missing_meta_defaults_to_zero_results() {
        let response: JobsResponse = serde_json::from_str(r#"{"jobs": []}"#).unwrap();
        assert_eq!(response.meta.result_count, 0);
        assert!(response.jobs.is_empty());
    }
}
