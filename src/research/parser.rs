//! Defensive parsing of agent output.
//!
//! Model output is untrusted. It may be bare JSON, JSON inside a code fence,
//! JSON buried in prose, or not JSON at all. [`parse_agent_output`] finds
//! the array if there is one and [`normalize_item`] coerces each element
//! into a candidate, dropping anything without a usable title.

use crate::types::{Reference, UNKNOWN_AUTHOR, UNKNOWN_YEAR};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Outcome of looking for a JSON array in agent output.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    Ok(Vec<Value>),
    Malformed,
}

impl ParseResult {
    pub fn is_malformed(&self) -> bool {
        matches!(self, ParseResult::Malformed)
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            ParseResult::Ok(items) => items,
            ParseResult::Malformed => Vec::new(),
        }
    }
}

fn array_span() -> &'static Regex {
    static SPAN: OnceLock<Regex> = OnceLock::new();
    SPAN.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("array span is a valid regex"))
}

fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json", "JSON", ...) on the opening fence line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn parse_array(text: &str) -> Option<Vec<Value>> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::Array(items) => Some(items),
        _ => None,
    }
}

/// First JSON array that starts at some `[` in `text`, trailing prose ignored.
///
/// Arrays holding at least one object win over bare lists like `[1]`, which
/// show up in prose as footnote markers.
fn scan_arrays(text: &str) -> Option<Vec<Value>> {
    let mut fallback = None;
    for (start, _) in text.match_indices('[') {
        let mut values = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        let Some(Ok(Value::Array(items))) = values.next() else {
            continue;
        };
        if items.iter().any(Value::is_object) {
            return Some(items);
        }
        fallback.get_or_insert(items);
    }
    fallback
}

/// Locate and parse the JSON array in `text`.
pub fn parse_agent_output(text: &str) -> ParseResult {
    if let Some(items) = parse_array(strip_fence(text)) {
        return ParseResult::Ok(items);
    }

    if let Some(items) = array_span()
        .find(text)
        .and_then(|span| parse_array(span.as_str()))
    {
        return ParseResult::Ok(items);
    }

    match scan_arrays(text) {
        Some(items) => ParseResult::Ok(items),
        None => ParseResult::Malformed,
    }
}

fn text_field(item: &Value, key: &str) -> Option<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn authors_field(item: &Value) -> Vec<String> {
    let authors: Vec<String> = match item.get("authors") {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|author| !author.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(joined)) => split_authors(joined),
        _ => Vec::new(),
    };

    if authors.is_empty() {
        vec![UNKNOWN_AUTHOR.to_string()]
    } else {
        authors
    }
}

/// Split a joined author string.
///
/// `;` and ` and ` always separate authors. `,` only does when there is no
/// `;`, since "Family, Given; Family, Given" uses it inside names.
fn split_authors(joined: &str) -> Vec<String> {
    let joined = joined.replace(" and ", ";");
    let separators: &[char] = if joined.contains(';') { &[';'] } else { &[';', ','] };
    joined
        .split(separators)
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .map(str::to_string)
        .collect()
}

fn year_field(item: &Value) -> String {
    match item.get("year") {
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(year)) if !year.trim().is_empty() => year.trim().to_string(),
        _ => UNKNOWN_YEAR.to_string(),
    }
}

/// Coerce one array element into a candidate attributed to `agent`.
///
/// Returns `None` when the element has no title with at least one
/// alphanumeric character.
pub fn normalize_item(item: &Value, agent: &str) -> Option<Reference> {
    let title = text_field(item, "title")
        .filter(|title| title.chars().any(char::is_alphanumeric))?;

    let mut reference = Reference::candidate(title, agent);
    reference.authors = authors_field(item);
    reference.year = year_field(item);
    reference.doi = text_field(item, "doi");
    reference.url = text_field(item, "url");
    reference.venue = text_field(item, "venue");
    reference.snippet = text_field(item, "snippet");
    reference.is_preprint = item
        .get("isPreprint")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    reference.is_verified = false;

    Some(reference)
}

/// Parse `text` and normalize every usable element.
pub fn parse_candidates(text: &str, agent: &str) -> Vec<Reference> {
    let result = parse_agent_output(text);
    if result.is_malformed() {
        tracing::warn!(agent, "Agent output contained no JSON array");
    }

    result
        .into_items()
        .iter()
        .filter_map(|item| normalize_item(item, agent))
        .collect()
}
