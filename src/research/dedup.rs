//! Title-based deduplication of agent candidates.

use crate::types::Reference;
use std::collections::HashSet;

/// Dedup identity of a title: lowercase alphanumerics only, full length.
pub fn normalize_title_key(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Drop every candidate whose title key was already seen; the first
/// occurrence wins.
pub fn dedupe_by_title(candidates: Vec<Reference>) -> Vec<Reference> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(normalize_title_key(&candidate.title)))
        .collect()
}
