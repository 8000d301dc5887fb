//! DOI normalization
//!
//! Agents and sources hand back DOIs in every imaginable shape:
//! `https://doi.org/10.1000/XYZ`, `doi:10.1000/xyz.`, `DOI 10.1000/xyz`,
//! URL-encoded slashes. Everything funnels through [`normalize_doi`], which
//! extracts the canonical `10.<registrant>/<suffix>` form or rejects the input.

use regex::Regex;
use std::sync::OnceLock;

fn doi_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // SICI suffixes carry `<...>` inside the DOI; a bracket that ends the
        // match or opens a closing tag is markup
        Regex::new(r#"(?i)10\.\d{4,9}/[^\s"<>]+(?:[<>][^\s"<>/][^\s"<>]*)*"#)
            .expect("DOI pattern is a valid regex")
    })
}

/// Extract the canonical, lowercased DOI from `raw`.
///
/// Returns `None` when nothing DOI-shaped can be found.
pub fn normalize_doi(raw: &str) -> Option<String> {
    let decoded = raw.trim().replace("%2F", "/").replace("%2f", "/");
    let found = doi_pattern().find(&decoded)?;

    let doi = found
        .as_str()
        .trim_end_matches(['.', ',', ';', ':', ')', ']', '}', '\'']);
    if doi.ends_with('/') {
        return None;
    }

    Some(doi.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("10.1000/xyz", Some("10.1000/xyz"))]
    #[case("https://doi.org/10.1000/XYZ", Some("10.1000/xyz"))]
    #[case("http://dx.doi.org/10.1145/3292500.3330701", Some("10.1145/3292500.3330701"))]
    #[case("doi:10.1038/nature14539.", Some("10.1038/nature14539"))]
    #[case("DOI: 10.1109/5.771073", Some("10.1109/5.771073"))]
    #[case("https://doi.org/10.1000%2Fabc", Some("10.1000/abc"))]
    #[case("(see 10.1016/j.cell.2020.01.001)", Some("10.1016/j.cell.2020.01.001"))]
    #[case("10.1002/(SICI)1097-4571", Some("10.1002/(sici)1097-4571"))]
    #[case(
        "10.1002/(SICI)1097-4571(199806)49:8<693::AID-ASI4>3.0.CO;2-O",
        Some("10.1002/(sici)1097-4571(199806)49:8<693::aid-asi4>3.0.co;2-o")
    )]
    #[case("<doi>10.1000/xyz</doi>", Some("10.1000/xyz"))]
    #[case("<10.1000/xyz>", Some("10.1000/xyz"))]
    #[case("", None)]
    #[case("n/a", None)]
    #[case("arXiv:1706.03762", None)]
    #[case("10.12/too-short-registrant", None)]
    #[case("10.1000/", None)]
    fn test_normalize_doi(#[case] raw: &str, #[case] expected: Option<&str>) {
        assert_eq!(normalize_doi(raw).as_deref(), expected);
    }
}
