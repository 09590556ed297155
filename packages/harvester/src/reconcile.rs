//! Delta computation against the recorded history.

use std::collections::HashSet;

use crate::types::Posting;

/// Postings whose URL has not been seen before.
///
/// `existing_urls` comes from the history store. Candidates repeating a URL
/// within the same batch collapse to the first occurrence, so the store's
/// URL-uniqueness invariant holds even when several boards return the same
/// posting. Order is stable.
pub fn reconcile(candidates: Vec<Posting>, existing_urls: &HashSet<String>) -> Vec<Posting> {
    let mut seen: HashSet<String> = HashSet::new();

    candidates
        .into_iter()
        .filter(|posting| {
            !existing_urls.contains(&posting.url) && seen.insert(posting.url.clone())
        })
        .collect()
}
