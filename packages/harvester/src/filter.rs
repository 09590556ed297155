//! Role-of-interest filtering.

use crate::types::Posting;

/// Keep postings whose title contains at least one role keyword as a plain
/// substring, case-insensitively.
///
/// Whole keywords match, not individual words: the keyword
/// `"data engineer"` matches `"Senior Data Engineer (Remote)"` but not
/// `"Data Entry Clerk"`. An empty keyword list keeps nothing. Order is
/// preserved.
pub fn filter_by_roles(postings: Vec<Posting>, roles: &[String]) -> Vec<Posting> {
    if roles.is_empty() {
        return Vec::new();
    }
    let roles: Vec<String> = roles.iter().map(|role| role.to_lowercase()).collect();

    postings
        .into_iter()
        .filter(|posting| {
            let title = posting.title.to_lowercase();
            roles.iter().any(|role| title.contains(role.as_str()))
        })
        .collect()
}
