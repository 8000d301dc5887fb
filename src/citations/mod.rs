//! Citation Verification
//!
//! Everything between "an agent claims this paper exists" and "this is a
//! verified, citable reference":
//!
//! - [`doi`] - DOI extraction and normalization
//! - [`merge`] - trust-ordered field merging of source records
//! - [`resolver::BibliographicResolver`] - resolves one candidate against
//!   the primary index, citation graph and DOI registry
//! - [`validator::ReferenceValidator`] - order-preserving concurrent batches
//! - [`bibtex`] - BibTeX entries and citation keys
//!
//! # Trust order
//!
//! Records are merged registry first, then citation graph, then primary
//! index. A later record wins for any field it fills in.

pub mod bibtex;
pub mod doi;
pub mod merge;
pub mod resolver;
pub mod validator;

pub use bibtex::{assign_citation_keys, derive_citation_key, to_bibtex};
pub use doi::normalize_doi;
pub use merge::{merge_record, MergePolicy};
pub use resolver::BibliographicResolver;
pub use validator::ReferenceValidator;
