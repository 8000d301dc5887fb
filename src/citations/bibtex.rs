//! BibTeX rendering and citation keys.

use crate::types::{Reference, UNKNOWN_AUTHOR, UNKNOWN_YEAR};
use std::collections::HashSet;

/// Words skipped when picking the title word of a citation key
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "on", "of", "in", "for", "and", "to", "with", "towards", "toward", "via",
    "from", "at", "by", "is", "are",
];

fn escape(value: &str) -> String {
    value.replace('{', "\\{").replace('}', "\\}")
}

fn ascii_word(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

fn first_surname(reference: &Reference) -> String {
    reference
        .authors
        .iter()
        .find(|author| author.as_str() != UNKNOWN_AUTHOR)
        .and_then(|author| {
            // "Family, Given" or "Given Family"
            match author.split_once(',') {
                Some((family, _)) => Some(family.to_string()),
                None => author.split_whitespace().last().map(str::to_string),
            }
        })
        .map(|surname| ascii_word(&surname))
        .filter(|surname| !surname.is_empty())
        .unwrap_or_else(|| "anon".to_string())
}

fn key_year(reference: &Reference) -> String {
    let digits: String = reference.year.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 4 {
        digits
    } else {
        "nd".to_string()
    }
}

fn title_word(reference: &Reference) -> String {
    reference
        .title
        .split_whitespace()
        .map(ascii_word)
        .find(|word| !word.is_empty() && !STOP_WORDS.contains(&word.as_str()))
        .unwrap_or_default()
}

/// Base citation key for `reference`: `surnameYEARword`.
pub fn derive_citation_key(reference: &Reference) -> String {
    format!(
        "{}{}{}",
        first_surname(reference),
        key_year(reference),
        title_word(reference)
    )
}

/// Give every reference without a key a unique one.
///
/// References that already carry a key keep it, and their keys are reserved
/// before any new key is handed out. Collisions get `a`, `b`, ... suffixes.
pub fn assign_citation_keys(references: &mut [Reference]) {
    let mut taken: HashSet<String> = references
        .iter()
        .filter_map(|reference| reference.citation_key.clone())
        .collect();

    for reference in references.iter_mut() {
        if reference.citation_key.is_some() {
            continue;
        }

        let base = derive_citation_key(reference);
        let mut key = base.clone();
        let mut suffix = 0usize;
        while taken.contains(&key) {
            key = format!("{}{}", base, suffix_label(suffix));
            suffix += 1;
        }

        taken.insert(key.clone());
        reference.citation_key = Some(key);
        // A rendered entry must carry the assigned key
        if reference.bibtex.is_some() {
            reference.bibtex = Some(to_bibtex(reference));
        }
    }
}

fn suffix_label(mut index: usize) -> String {
    // a..z, then aa, ab, ...
    let mut label = Vec::new();
    loop {
        label.push((b'a' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    label.iter().rev().collect()
}

/// Render `reference` as a BibTeX entry.
///
/// `@article` when a venue is known, `@misc` otherwise.
pub fn to_bibtex(reference: &Reference) -> String {
    let key = reference
        .citation_key
        .clone()
        .unwrap_or_else(|| derive_citation_key(reference));
    let entry_type = if reference.venue.is_some() {
        "article"
    } else {
        "misc"
    };

    let mut fields: Vec<(&str, String)> = vec![("title", escape(&reference.title))];

    let authors: Vec<&str> = reference
        .authors
        .iter()
        .map(String::as_str)
        .filter(|author| *author != UNKNOWN_AUTHOR)
        .collect();
    if !authors.is_empty() {
        fields.push(("author", escape(&authors.join(" and "))));
    }
    if reference.year != UNKNOWN_YEAR {
        fields.push(("year", escape(&reference.year)));
    }
    if let Some(venue) = &reference.venue {
        fields.push(("journal", escape(venue)));
    }
    if let Some(doi) = &reference.doi {
        fields.push(("doi", escape(doi)));
    }
    if let Some(url) = &reference.url {
        fields.push(("url", escape(url)));
    }

    let body = fields
        .iter()
        .map(|(name, value)| format!("  {} = {{{}}}", name, value))
        .collect::<Vec<_>>()
        .join(",\n");

    format!("@{}{{{},\n{}\n}}", entry_type, key, body)
}
