//! LinkedIn board adapter.
//!
//! Uses the public guest search endpoint, which serves paginated HTML job
//! cards without authentication. Cards carry tracking query parameters on
//! their links; those are stripped so the URL can serve as the posting's
//! identity across runs.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::error::{SourceError, SourceResult};
use crate::stop::StopSignal;
use crate::types::{RawPosting, SourceBatch};

use super::{JobSource, SourceQuery};

const SEARCH_URL: &str = "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search";

/// Cards per guest search page.
const PAGE_SIZE: usize = 25;

pub struct LinkedinSource {
    client: reqwest::Client,
}

impl LinkedinSource {
    pub fn new() -> SourceResult<Self> {
        // The guest endpoint rejects obvious non-browser clients.
        let user_agent = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    async fn fetch_page(&self, query: &SourceQuery, start: usize) -> SourceResult<String> {
        let posted_within = time_posted_param(query.lookback_hours);
        let start_param = start.to_string();
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("keywords", query.search_term.as_str()),
                ("location", query.country.as_str()),
                ("f_TPR", posted_within.as_str()),
                ("start", start_param.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: format!("guest search returned {status}"),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl JobSource for LinkedinSource {
    fn name(&self) -> &str {
        "linkedin"
    }

    async fn fetch(&self, query: &SourceQuery, stop: &StopSignal) -> SourceResult<SourceBatch> {
        let mut postings: Vec<RawPosting> = Vec::new();
        let mut start = 0;
        let mut possibly_truncated = false;

        loop {
            if stop.is_stopped() {
                debug!(collected = postings.len(), "Stop requested, ending LinkedIn pagination");
                break;
            }

            let html = match self.fetch_page(query, start).await {
                Ok(html) => html,
                Err(e) if postings.is_empty() => return Err(e),
                Err(e) => {
                    warn!(start, error = %e, "LinkedIn page fetch failed, returning partial results");
                    break;
                }
            };

            let cards = parse_cards(&html);
            if cards.is_empty() {
                break;
            }
            let page_len = cards.len();
            postings.extend(cards);
            debug!(
                fetched = page_len,
                start,
                collected = postings.len(),
                "Fetched LinkedIn page"
            );

            if postings.len() >= query.max_results {
                // A full page at the cap means the board likely had more.
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

/// Guest search `f_TPR` value for a lookback in hours.
fn time_posted_param(hours: u32) -> String {
    format!("r{}", u64::from(hours) * 3600)
}

/// Parse guest-search card markup into raw postings.
fn parse_cards(html: &str) -> Vec<RawPosting> {
    try_parse_cards(html).unwrap_or_default()
}

fn try_parse_cards(html: &str) -> Option<Vec<RawPosting>> {
    let card_sel = Selector::parse("div.base-search-card").ok()?;
    let link_sel = Selector::parse("a.base-card__full-link").ok()?;
    let title_sel = Selector::parse("h3.base-search-card__title").ok()?;
    let company_sel = Selector::parse("h4.base-search-card__subtitle").ok()?;
    let location_sel = Selector::parse("span.job-search-card__location").ok()?;

    let document = Html::parse_document(html);
    let mut postings = Vec::new();

    for card in document.select(&card_sel) {
        let mut raw = RawPosting::new();

        if let Some(href) = card
            .select(&link_sel)
            .next()
            .and_then(|el| el.value().attr("href"))
        {
            raw = raw.with_url(clean_job_url(href));
        }
        if let Some(title) = first_text(&card, &title_sel) {
            raw = raw.with_title(title);
        }
        if let Some(company) = first_text(&card, &company_sel) {
            raw = raw.with_company(company);
        }
        if let Some(location) = first_text(&card, &location_sel) {
            raw = raw.with_location(location);
        }

        postings.push(raw);
    }

    Some(postings)
}

/// Trimmed text of the first element matching `selector` inside `card`.
fn first_text(card: &scraper::ElementRef, selector: &Selector) -> Option<String> {
    card.select(selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Strip the query string and fragment so the URL is stable across sessions.
fn clean_job_url(href: &str) -> String {
    match Url::parse(href) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => href.split('?').next().unwrap_or(href).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARDS_HTML: &str = r#"
        <ul>
          <li>
            <div class="base-search-card base-search-card--link job-search-card">
              <a class="base-card__full-link" href="https://www.linkedin.com/jobs/view/senior-data-engineer-at-acme-4100?refId=abc123&trackingId=xyz">
                <span class="sr-only">Senior Data Engineer</span>
              </a>
              <div class="base-search-card__info">
                <h3 class="base-search-card__title">Senior Data Engineer</h3>
                <h4 class="base-search-card__subtitle"><a>Acme Analytics</a></h4>
                <div class="base-search-card__metadata">
                  <span class="job-search-card__location">Bengaluru, Karnataka, India</span>
                </div>
              </div>
            </div>
          </li>
          <li>
            <div class="base-search-card">
              <h3 class="base-search-card__title">ML Engineer</h3>
            </div>
          </li>
        </ul>
    "#;

    #[test]
    fn parses_cards_and_strips_tracking_params() {
        let cards = parse_cards(CARDS_HTML);
        assert_eq!(cards.len(), 2);

        assert_eq!(
            cards[0].url.as_deref(),
            Some("https://www.linkedin.com/jobs/view/senior-data-engineer-at-acme-4100")
        );
        assert_eq!(cards[0].title.as_deref(), Some("Senior Data Engineer"));
        assert_eq!(cards[0].company.as_deref(), Some("Acme Analytics"));
        assert_eq!(
            cards[0].location.as_deref(),
            Some("Bengaluru, Karnataka, India")
        );

        // Second card has no link; normalization will drop it later.
        assert_eq!(cards[1].url, None);
        assert_eq!(cards[1].title.as_deref(), Some("ML Engineer"));
    }

    #[test]
    fn empty_page_yields_no_cards() {
        assert!(parse_cards("<html><body></body></html>").is_empty());
    }

    #[test]
    fn lookback_is_encoded_in_seconds() {
        assert_eq!(time_posted_param(1), "r3600");
        assert_eq!(time_posted_param(24), "r86400");
    }

    #[test]
    fn clean_job_url_keeps_path_only() {
        assert_eq!(
            clean_job_url("https://example.com/jobs/view/1?refId=a#top"),
            "https://example.com/jobs/view/1"
        );
        assert_eq!(clean_job_url("not a url?x=1"), "not a url");
    }
}
