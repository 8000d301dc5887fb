//! Final quality gate applied to validated references.

use crate::types::Reference;
use serde::{Deserialize, Serialize};

/// Which validated references are kept for curation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QualityFilter {
    /// Keep verified references and unverified ones whose DOI field looks
    /// like a DOI (contains `10.`). Slow-to-index work survives this way,
    /// at the cost of letting some hallucinated DOIs through.
    #[default]
    VerifiedOrDoi,
    /// Keep verified references only
    VerifiedOnly,
}

impl QualityFilter {
    pub fn retains(self, reference: &Reference) -> bool {
        match self {
            QualityFilter::VerifiedOrDoi => reference.is_verified || reference.has_doi_shape(),
            QualityFilter::VerifiedOnly => reference.is_verified,
        }
    }

    pub fn apply(self, references: Vec<Reference>) -> Vec<Reference> {
        references
            .into_iter()
            .filter(|reference| self.retains(reference))
            .collect()
    }
}

/// Verified/unverified counts for a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SearchSummary {
    pub verified: usize,
    pub unverified: usize,
}

impl SearchSummary {
    pub fn of(references: &[Reference]) -> Self {
        let verified = references.iter().filter(|r| r.is_verified).count();
        Self {
            verified,
            unverified: references.len() - verified,
        }
    }

    pub fn total(&self) -> usize {
        self.verified + self.unverified
    }
}

impl std::fmt::Display for SearchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} verified, {} unverified", self.verified, self.unverified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unverified(doi: Option<&str>) -> Reference {
        let reference = Reference::candidate("T", "a");
        match doi {
            Some(doi) => reference.with_doi(doi),
            None => reference,
        }
    }

    #[test]
    fn test_lenient_filter_boundary() {
        let filter = QualityFilter::VerifiedOrDoi;
        assert!(filter.retains(&unverified(Some("10.1000/xyz"))));
        assert!(!filter.retains(&unverified(None)));
        assert!(!filter.retains(&unverified(Some("arXiv:1706.03762"))));

        let mut verified = unverified(None);
        verified.is_verified = true;
        assert!(filter.retains(&verified));
    }

    #[test]
    fn test_strict_filter_drops_unverified_dois() {
        assert!(!QualityFilter::VerifiedOnly.retains(&unverified(Some("10.1000/xyz"))));
    }

    #[test]
    fn test_summary() {
        let mut verified = unverified(None);
        verified.is_verified = true;
        let summary = SearchSummary::of(&[verified, unverified(None), unverified(None)]);
        assert_eq!(summary.to_string(), "1 verified, 2 unverified");
        assert_eq!(summary.total(), 3);
    }
}
