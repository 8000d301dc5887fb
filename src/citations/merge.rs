//! Field-level merge of bibliographic records into a reference
//!
//! Records are applied in ascending order of trust, so a later record wins
//! whenever it has something to say. Three gates keep weak data out:
//!
//! - text and list fields are only overwritten by non-empty values
//! - `citation_count` never decreases
//! - an abstract only replaces the current one when it is longer than
//!   [`MergePolicy::min_abstract_len`]

use crate::types::{Reference, SourceRecord};

/// Thresholds applied while merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergePolicy {
    /// Incoming abstracts must be strictly longer than this (in characters)
    pub min_abstract_len: usize,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            min_abstract_len: 50,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Overlay `record` onto `reference`.
pub fn merge_record(reference: &mut Reference, record: &SourceRecord, policy: &MergePolicy) {
    if let Some(title) = non_empty(&record.title) {
        reference.title = title.to_string();
    }
    if let Some(year) = non_empty(&record.year) {
        reference.year = year.to_string();
    }
    if let Some(venue) = non_empty(&record.venue) {
        reference.venue = Some(venue.to_string());
    }
    if let Some(url) = non_empty(&record.url) {
        reference.url = Some(url.to_string());
    }

    let authors: Vec<String> = record
        .authors
        .iter()
        .map(|author| author.trim())
        .filter(|author| !author.is_empty())
        .map(str::to_string)
        .collect();
    if !authors.is_empty() {
        reference.authors = authors;
    }

    let fields: Vec<String> = record
        .fields_of_study
        .iter()
        .map(|field| field.trim())
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect();
    if !fields.is_empty() {
        reference.fields_of_study = Some(fields);
    }

    if let Some(incoming) = record.citation_count {
        if reference.citation_count.map_or(true, |current| incoming > current) {
            reference.citation_count = Some(incoming);
        }
    }

    if let Some(text) = non_empty(&record.abstract_text) {
        if text.chars().count() > policy.min_abstract_len {
            reference.abstract_text = Some(text.to_string());
        }
    }
}
