//! Core posting types shared across the pipeline.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Location placeholder used when a board omits the posting location.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// A board-shaped posting before validation.
///
/// Board adapters map their wire formats into this; normalization decides
/// whether it can become a [`Posting`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPosting {
    pub url: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
}

impl RawPosting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// One canonical job posting.
///
/// The URL is the posting's identity: the history store never retains two
/// records with the same URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(rename = "job_url")]
    pub url: String,
    pub title: String,
    /// May be empty when the board did not report one.
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
}

impl Posting {
    /// Posting with the given identity and title; company empty, location
    /// the unknown placeholder.
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            company: String::new(),
            location: UNKNOWN_LOCATION.to_string(),
        }
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Stamp this posting with the run that accepted it.
    pub fn accepted_at(self, stamp: &RunStamp) -> AcceptedPosting {
        AcceptedPosting {
            posting: self,
            scrape_date: stamp.date.clone(),
            scrape_time: stamp.time.clone(),
        }
    }
}

/// A posting accepted into the history, stamped with the accepting run.
///
/// The stamp records when this system first saw the posting, not when the
/// board published it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptedPosting {
    #[serde(flatten)]
    pub posting: Posting,
    pub scrape_date: String,
    pub scrape_time: String,
}

/// Date and time strings identifying one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStamp {
    /// `%Y-%m-%d`
    pub date: String,
    /// `%H:%M:%S`
    pub time: String,
}

impl RunStamp {
    /// Stamp for the current local time.
    pub fn now() -> Self {
        Self::at(Local::now())
    }

    /// Stamp for an explicit instant.
    pub fn at(when: DateTime<Local>) -> Self {
        Self {
            date: when.format("%Y-%m-%d").to_string(),
            time: when.format("%H:%M:%S").to_string(),
        }
    }
}

/// One board's fetch result.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub postings: Vec<RawPosting>,
    /// True when pagination stopped at the result cap while the board still
    /// reported more; the batch may not cover everything available.
    pub possibly_truncated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_posting_serializes_with_flattened_record_keys() {
        let stamp = RunStamp {
            date: "2025-05-04".to_string(),
            time: "09:15:00".to_string(),
        };
        let accepted = Posting::new("https://jobs.example/1", "Data Engineer")
            .with_company("Acme")
            .with_location("Pune")
            .accepted_at(&stamp);

        let value = serde_json::to_value(&accepted).unwrap();
        assert_eq!(value["job_url"], "https://jobs.example/1");
        assert_eq!(value["title"], "Data Engineer");
        assert_eq!(value["company"], "Acme");
        assert_eq!(value["location"], "Pune");
        assert_eq!(value["scrape_date"], "2025-05-04");
        assert_eq!(value["scrape_time"], "09:15:00");
    }

    #[test]
    fn new_posting_defaults_location_to_unknown() {
        let posting = Posting::new("https://jobs.example/2", "ML Engineer");
        assert_eq!(posting.location, UNKNOWN_LOCATION);
        assert!(posting.company.is_empty());
    }

    #[test]
    fn run_stamp_formats_date_and_time() {
        use chrono::TimeZone;
        let when = Local.with_ymd_and_hms(2025, 5, 4, 18, 3, 7).unwrap();
        let stamp = RunStamp::at(when);
        assert_eq!(stamp.date, "2025-05-04");
        assert_eq!(stamp.time, "18:03:07");
    }
}
