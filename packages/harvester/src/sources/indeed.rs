//! Indeed board adapter.
//!
//! Reads the search results page and extracts the job-card payload the page
//! embeds as JSON under `window.mosaic.providerData`. The embedded payload
//! is stabler than the card markup, which Indeed reshuffles frequently.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};
use crate::stop::StopSignal;
use crate::types::{RawPosting, SourceBatch};

use super::{JobSource, SourceQuery};

/// Cards per search results page.
const PAGE_SIZE: usize = 10;

/// Script assignment that carries the job-card payload.
static JOBCARDS_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"window\.mosaic\.providerData\["mosaic-provider-jobcards"\]\s*=\s*"#).unwrap()
});

pub struct IndeedSource {
    client: reqwest::Client,
}

impl IndeedSource {
    pub fn new() -> SourceResult<Self> {
        let user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    async fn fetch_page(
        &self,
        domain: &str,
        query: &SourceQuery,
        start: usize,
    ) -> SourceResult<String> {
        let fromage = fromage_days(query.lookback_hours).to_string();
        let start_param = start.to_string();
        let url = format!("https://{domain}/jobs");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query.search_term.as_str()),
                ("fromage", fromage.as_str()),
                ("sort", "date"),
                ("start", start_param.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: format!("search page returned {status}"),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl JobSource for IndeedSource {
    fn name(&self) -> &str {
        "indeed"
    }

    async fn fetch(&self, query: &SourceQuery, stop: &StopSignal) -> SourceResult<SourceBatch> {
        let domain = domain_for_country(&query.country);
        let mut postings: Vec<RawPosting> = Vec::new();
        let mut start = 0;
        let mut possibly_truncated = false;

        loop {
            if stop.is_stopped() {
                debug!(collected = postings.len(), "Stop requested, ending Indeed pagination");
                break;
            }

            let html = match self.fetch_page(domain, query, start).await {
                Ok(html) => html,
                Err(e) if postings.is_empty() => return Err(e),
                Err(e) => {
                    warn!(start, error = %e, "Indeed page fetch failed, returning partial results");
                    break;
                }
            };

            let cards = match parse_job_cards(&html, domain) {
                Ok(cards) => cards,
                Err(e) if postings.is_empty() => return Err(e),
                Err(e) => {
                    warn!(start, error = %e, "Indeed payload failed to parse, returning partial results");
                    break;
                }
            };
            if cards.is_empty() {
                break;
            }
            let page_len = cards.len();
            postings.extend(cards);
            debug!(
                fetched = page_len,
                start,
                collected = postings.len(),
                "Fetched Indeed page"
            );

            if postings.len() >= query.max_results {
                possibly_truncated = page_len == PAGE_SIZE;
                break;
            }
            if page_len < PAGE_SIZE {
                break;
            }
            start += PAGE_SIZE;
        }

        Ok(SourceBatch {
            postings,
            possibly_truncated,
        })
    }
}

/// Indeed serves each market from its own domain.
fn domain_for_country(country: &str) -> &'static str {
    match country.trim().to_lowercase().as_str() {
        "india" => "in.indeed.com",
        "united kingdom" | "uk" => "uk.indeed.com",
        "canada" => "ca.indeed.com",
        "australia" => "au.indeed.com",
        "germany" => "de.indeed.com",
        "singapore" => "sg.indeed.com",
        _ => "www.indeed.com",
    }
}

/// Indeed's lookback filter is whole days; round a sub-day lookback up so
/// recent postings are not filtered away.
fn fromage_days(hours: u32) -> u32 {
    hours.div_ceil(24).max(1)
}

#[derive(Debug, Deserialize)]
struct JobCardsPayload {
    #[serde(rename = "metaData", default)]
    meta: JobCardsMeta,
}

#[derive(Debug, Default, Deserialize)]
struct JobCardsMeta {
    #[serde(rename = "mosaicProviderJobCardsModel", default)]
    model: Option<JobCardsModel>,
}

#[derive(Debug, Deserialize)]
struct JobCardsModel {
    #[serde(default)]
    results: Vec<JobCard>,
}

#[derive(Debug, Deserialize)]
struct JobCard {
    #[serde(default)]
    jobkey: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "displayTitle", default)]
    display_title: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(rename = "formattedLocation", default)]
    formatted_location: Option<String>,
}

/// Extract and map the embedded job-card payload for one results page.
///
/// A page without the payload yields an empty batch; a page whose payload
/// is present but structurally broken is a [`SourceError::Malformed`].
fn parse_job_cards(html: &str, domain: &str) -> SourceResult<Vec<RawPosting>> {
    let Some(payload) = extract_jobcards_json(html)? else {
        return Ok(Vec::new());
    };

    let parsed: JobCardsPayload = serde_json::from_str(payload)
        .map_err(|e| SourceError::Malformed(format!("job-card payload: {e}")))?;

    let results = match parsed.meta.model {
        Some(model) => model.results,
        None => return Ok(Vec::new()),
    };

    Ok(results
        .into_iter()
        .map(|card| {
            let mut raw = RawPosting::new();
            if let Some(key) = card.jobkey {
                raw = raw.with_url(format!("https://{domain}/viewjob?jk={key}"));
            }
            if let Some(title) = card.display_title.or(card.title) {
                raw = raw.with_title(title);
            }
            if let Some(company) = card.company {
                raw = raw.with_company(company);
            }
            if let Some(location) = card.formatted_location {
                raw = raw.with_location(location);
            }
            raw
        })
        .collect())
}

/// Slice the job-card JSON object out of the page's script block.
///
/// `Ok(None)` means the page carries no payload at all.
fn extract_jobcards_json(html: &str) -> SourceResult<Option<&str>> {
    let Some(found) = JOBCARDS_MARKER.find(html) else {
        return Ok(None);
    };
    html[found.end()..]
        .find('{')
        .and_then(|offset| balanced_object(html, found.end() + offset))
        .map(Some)
        .ok_or_else(|| SourceError::Malformed("job-card payload never closes".to_string()))
}

/// The JSON object starting at `open`, found by brace counting with string
/// and escape awareness.
fn balanced_object(html: &str, open: usize) -> Option<&str> {
    let bytes = html.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes[open..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&html[open..=open + i]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_HTML: &str = r#"
        <html><head><script>
        window.mosaic.providerData["mosaic-provider-jobcards"]={"metaData":{"mosaicProviderJobCardsModel":{"results":[
            {"jobkey":"a1b2c3","displayTitle":"Data Engineer","title":"Data Engineer - Platform","company":"Acme {Analytics}","formattedLocation":"Pune, Maharashtra"},
            {"jobkey":"d4e5f6","title":"ML Engineer","company":"Beta \"Labs\""}
        ]}},"other":true};
        </script></head><body></body></html>
    "#;

    #[test]
    fn extracts_cards_from_embedded_payload() {
        let cards = parse_job_cards(RESULTS_HTML, "in.indeed.com").unwrap();
        assert_eq!(cards.len(), 2);

        assert_eq!(
            cards[0].url.as_deref(),
            Some("https://in.indeed.com/viewjob?jk=a1b2c3")
        );
        // displayTitle wins over the internal title field.
        assert_eq!(cards[0].title.as_deref(), Some("Data Engineer"));
        assert_eq!(cards[0].company.as_deref(), Some("Acme {Analytics}"));
        assert_eq!(cards[0].location.as_deref(), Some("Pune, Maharashtra"));

        assert_eq!(cards[1].title.as_deref(), Some("ML Engineer"));
        assert_eq!(cards[1].company.as_deref(), Some("Beta \"Labs\""));
        assert_eq!(cards[1].location, None);
    }

    #[test]
    fn page_without_payload_yields_nothing() {
        let cards = parse_job_cards("<html><body>captcha</body></html>", "www.indeed.com");
        assert!(cards.unwrap().is_empty());
    }

    #[test]
    fn brace_scan_survives_braces_and_quotes_inside_strings() {
        let html = r#"prefix window.mosaic.providerData["mosaic-provider-jobcards"] = {"a":"{\"}","b":{"c":1}} ; suffix"#;
        let json = extract_jobcards_json(html).unwrap().unwrap();
        assert_eq!(json, r#"{"a":"{\"}","b":{"c":1}}"#);
        let value: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(value["b"]["c"], 1);
    }

    #[test]
    fn broken_payload_is_rejected_as_malformed() {
        let unclosed =
            r#"<script>window.mosaic.providerData["mosaic-provider-jobcards"]={"metaData":{"#;
        assert!(matches!(
            parse_job_cards(unclosed, "www.indeed.com"),
            Err(SourceError::Malformed(_))
        ));

        let invalid = r#"window.mosaic.providerData["mosaic-provider-jobcards"]={"metaData":nope}"#;
        assert!(matches!(
            parse_job_cards(invalid, "www.indeed.com"),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn market_domains_resolve_with_global_fallback() {
        assert_eq!(domain_for_country("India"), "in.indeed.com");
        assert_eq!(domain_for_country("united kingdom"), "uk.indeed.com");
        assert_eq!(domain_for_country("Atlantis"), "www.indeed.com");
    }

    #[test]
    fn lookback_rounds_up_to_whole_days() {
        assert_eq!(fromage_days(1), 1);
        assert_eq!(fromage_days(24), 1);
        assert_eq!(fromage_days(25), 2);
        assert_eq!(fromage_days(0), 1);
    }
}
