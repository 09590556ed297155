//! Per-run configuration, supplied by the external settings collaborator.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{HarvestError, Result};

/// Boards a run can harvest from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardId {
    Linkedin,
    Indeed,
    Skillsire,
}

impl BoardId {
    /// Id as it appears in `scrape_from`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linkedin => "linkedin",
            Self::Indeed => "indeed",
            Self::Skillsire => "skillsire",
        }
    }

    /// Parse a `scrape_from` entry, case-insensitively.
    pub fn parse(id: &str) -> Option<Self> {
        match id.trim().to_lowercase().as_str() {
            "linkedin" => Some(Self::Linkedin),
            "indeed" => Some(Self::Indeed),
            "skillsire" => Some(Self::Skillsire),
            _ => None,
        }
    }
}

/// Immutable configuration for one pipeline invocation.
///
/// Mirrors the collaborator's `scraper_settings.json`. Every field has a
/// default, so a partial settings file only overrides what it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Lookback window requested from each board, in hours.
    pub hours: u32,
    /// Pause between iterations in the collaborator's looping mode. The
    /// single-run pipeline accepts it for settings-file compatibility and
    /// ignores it.
    pub sleep_time: u64,
    /// Ids of the boards to harvest from.
    pub scrape_from: Vec<String>,
    /// Search query sent to each board.
    pub search_term: String,
    /// Result cap per board.
    pub results_fetch_count: usize,
    /// Country used for board-side market selection.
    pub country_to_search: String,
    /// Optional prefix for the generated ledger file name.
    pub file_name_prefix: String,
    /// Role keywords; a posting survives the filter when its title contains
    /// any of these, case-insensitively.
    pub roles_of_interest: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            hours: 1,
            sleep_time: 10,
            scrape_from: vec![
                "linkedin".to_string(),
                "indeed".to_string(),
                "skillsire".to_string(),
            ],
            search_term: "machine learning engineer".to_string(),
            results_fetch_count: 300,
            country_to_search: "India".to_string(),
            file_name_prefix: String::new(),
            roles_of_interest: [
                "DevOps",
                "Data Engineer",
                "Computer Vision Engineer",
                "NLP Engineer",
                "AI Researcher",
                "AI Scientist",
                "AI Specialist",
                "AI Developer",
                "Data Scientist",
                "Machine Learning Engineer",
                "AI Engineer",
                "Cloud Engineer",
                "Data Analyst",
                "Data Architect",
                "Big Data Engineer",
                "Data Visualization",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

impl RunConfig {
    /// Load settings from the collaborator's JSON file.
    ///
    /// A missing file yields the defaults, matching the collaborator's
    /// behavior before any settings have been saved.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default().folded());
        }
        let raw = std::fs::read_to_string(path).map_err(|e| HarvestError::config(path, e))?;
        let config: Self =
            serde_json::from_str(&raw).map_err(|e| HarvestError::config(path, e))?;
        Ok(config.folded())
    }

    /// Enabled boards, in `scrape_from` order. Unknown ids are skipped with
    /// a warning rather than failing the run.
    pub fn boards(&self) -> Vec<BoardId> {
        self.scrape_from
            .iter()
            .filter_map(|id| match BoardId::parse(id) {
                Some(board) => Some(board),
                None => {
                    warn!(board = %id, "Unknown board id in scrape_from, skipping");
                    None
                }
            })
            .collect()
    }

    /// Case-fold the role keywords once so the filter compares lowercase
    /// against lowercase.
    fn folded(mut self) -> Self {
        for role in &mut self.roles_of_interest {
            *role = role.to_lowercase();
        }
        self
    }
}
