//! Validation of board-shaped records into canonical postings.

use tracing::warn;
use url::Url;

use crate::types::{Posting, RawPosting};

/// Validate one raw record.
///
/// A record without a usable absolute http(s) URL has no identity and is
/// dropped, as is one without a title; both are logged rather than failing
/// the batch. A missing location falls back to the unknown placeholder and
/// a missing company stays empty.
pub fn normalize(raw: RawPosting) -> Option<Posting> {
    let url = match raw.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => {
            warn!(
                title = raw.title.as_deref().unwrap_or(""),
                "Dropping raw posting without a URL"
            );
            return None;
        }
    };
    if !is_absolute_http(&url) {
        warn!(url = %url, "Dropping raw posting with a non-absolute URL");
        return None;
    }

    let title = match raw.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => {
            warn!(url = %url, "Dropping raw posting without a title");
            return None;
        }
    };

    let mut posting = Posting::new(url, title);
    if let Some(company) = raw.company.as_deref().map(str::trim) {
        if !company.is_empty() {
            posting = posting.with_company(company);
        }
    }
    if let Some(location) = raw.location.as_deref().map(str::trim) {
        if !location.is_empty() {
            posting = posting.with_location(location);
        }
    }
    Some(posting)
}

/// Normalize a batch, preserving order and dropping invalid records.
pub fn normalize_batch(raw: Vec<RawPosting>) -> Vec<Posting> {
    raw.into_iter().filter_map(normalize).collect()
}

/// The posting identity must be an absolute http(s) URL.
fn is_absolute_http(url: &str) -> bool {
    matches!(
        Url::parse(url),
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNKNOWN_LOCATION;

    #[test]
    fn complete_record_normalizes() {
        let posting = normalize(
            RawPosting::new()
                .with_url("https://jobs.example/1")
                .with_title("  Data Engineer ")
                .with_company("Acme")
                .with_location("Pune"),
        )
        .unwrap();

        assert_eq!(posting.url, "https://jobs.example/1");
        assert_eq!(posting.title, "Data Engineer");
        assert_eq!(posting.company, "Acme");
        assert_eq!(posting.location, "Pune");
    }

    #[test]
    fn record_without_url_is_dropped() {
        assert_eq!(normalize(RawPosting::new().with_title("Data Engineer")), None);
        assert_eq!(
            normalize(RawPosting::new().with_url("   ").with_title("Data Engineer")),
            None
        );
    }

    #[test]
    fn record_with_relative_url_is_dropped() {
        assert_eq!(
            normalize(
                RawPosting::new()
                    .with_url("/jobs/view/1")
                    .with_title("Data Engineer")
            ),
            None
        );
        assert_eq!(
            normalize(
                RawPosting::new()
                    .with_url("ftp://jobs.example/1")
                    .with_title("Data Engineer")
            ),
            None
        );
    }

    #[test]
    fn record_without_title_is_dropped() {
        assert_eq!(
            normalize(RawPosting::new().with_url("https://jobs.example/1")),
            None
        );
    }

    #[test]
    fn missing_location_becomes_unknown() {
        let posting = normalize(
            RawPosting::new()
                .with_url("https://jobs.example/1")
                .with_title("Data Engineer"),
        )
        .unwrap();
        assert_eq!(posting.location, UNKNOWN_LOCATION);
        assert!(posting.company.is_empty());
    }

    #[test]
    fn batch_preserves_order_and_drops_invalid() {
        let postings = normalize_batch(vec![
            RawPosting::new()
                .with_url("https://jobs.example/1")
                .with_title("Data Engineer"),
            RawPosting::new().with_title("no url"),
            RawPosting::new()
                .with_url("https://jobs.example/2")
                .with_title("ML Engineer"),
        ]);

        let urls: Vec<_> = postings.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["https://jobs.example/1", "https://jobs.example/2"]);
    }
}
