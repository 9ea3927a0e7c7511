//! Stable URL deduplication across the combined all-source batch.

use std::collections::HashSet;

use crate::model::RawCandidate;

/// Remove candidates whose URL appeared earlier in the batch.
///
/// Keeps the first occurrence and preserves first-seen order for the
/// survivors. This handles cross-source syndication (the same story in two
/// feeds) and pagination overlap within a single source.
pub fn dedup_by_url(candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.url.clone()))
        .collect()
}
