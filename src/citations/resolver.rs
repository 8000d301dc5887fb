//! Multi-source bibliographic resolution of a single candidate.

use super::bibtex::to_bibtex;
use super::doi::normalize_doi;
use super::merge::{merge_record, MergePolicy};
use crate::sources::{BibliographicSource, CrossrefClient, OpenAlexClient, SemanticScholarClient};
use crate::types::{Reference, Result, SourceRecord};
use crate::utils::toml_config::PapyrusConfig;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Resolves candidates against three ranked bibliographic sources.
///
/// The resolver never fails: a source that errors, times out or has no
/// record simply contributes nothing. Only when every source comes back
/// empty (or no DOI can be found at all) is the candidate left unverified.
#[derive(Clone)]
pub struct BibliographicResolver {
    primary: Arc<dyn BibliographicSource>,
    citation_graph: Arc<dyn BibliographicSource>,
    registry: Arc<dyn BibliographicSource>,
    timeout: Duration,
    merge_policy: MergePolicy,
}

impl BibliographicResolver {
    pub fn new(
        primary: Arc<dyn BibliographicSource>,
        citation_graph: Arc<dyn BibliographicSource>,
        registry: Arc<dyn BibliographicSource>,
        timeout: Duration,
    ) -> Self {
        Self {
            primary,
            citation_graph,
            registry,
            timeout,
            merge_policy: MergePolicy::default(),
        }
    }

    pub fn with_merge_policy(mut self, merge_policy: MergePolicy) -> Self {
        self.merge_policy = merge_policy;
        self
    }

    /// Build the OpenAlex / Semantic Scholar / Crossref resolver from config.
    pub fn from_config(config: &PapyrusConfig) -> Result<Self> {
        let sources = &config.sources;
        let timeout = sources.timeout();
        let mailto = sources.mailto();

        let primary = OpenAlexClient::new(&sources.openalex_base, mailto.clone(), timeout)?;
        let citation_graph = SemanticScholarClient::new(
            &sources.semantic_scholar_base,
            sources.semantic_scholar_key(),
            timeout,
        )?;
        let registry = CrossrefClient::new(&sources.crossref_base, mailto, timeout)?;

        Ok(Self::new(
            Arc::new(primary),
            Arc::new(citation_graph),
            Arc::new(registry),
            timeout,
        )
        .with_merge_policy(MergePolicy {
            min_abstract_len: config.validation.min_abstract_len,
        }))
    }

    /// Run one source call under the resolver timeout, degrading every
    /// failure to `None`.
    async fn contribution<F>(&self, source: &dyn BibliographicSource, call: F) -> Option<SourceRecord>
    where
        F: Future<Output = Result<Option<SourceRecord>>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(record)) => record,
            Ok(Err(e)) => {
                tracing::warn!(source = source.name(), error = %e, "Bibliographic lookup failed");
                None
            }
            Err(_) => {
                tracing::warn!(
                    source = source.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Bibliographic lookup timed out"
                );
                None
            }
        }
    }

    /// Find a DOI for `candidate`: its own if it normalizes, otherwise the
    /// primary index's best title match.
    async fn acquire_doi(&self, candidate: &Reference) -> Option<String> {
        if let Some(doi) = candidate.doi.as_deref().and_then(normalize_doi) {
            return Some(doi);
        }

        let hit = self
            .contribution(
                self.primary.as_ref(),
                self.primary.search_by_title(&candidate.title),
            )
            .await?;
        let doi = hit.doi.as_deref().and_then(normalize_doi);
        if doi.is_some() {
            tracing::debug!(title = %candidate.title, doi = ?doi, "Resolved DOI by title");
        }
        doi
    }

    /// Resolve and enrich `candidate`.
    pub async fn resolve(&self, mut candidate: Reference) -> Reference {
        let Some(doi) = self.acquire_doi(&candidate).await else {
            tracing::debug!(title = %candidate.title, "No DOI found; leaving unverified");
            candidate.is_verified = false;
            return candidate;
        };

        let (registry, citation_graph, primary) = tokio::join!(
            self.contribution(self.registry.as_ref(), self.registry.lookup_by_doi(&doi)),
            self.contribution(
                self.citation_graph.as_ref(),
                self.citation_graph.lookup_by_doi(&doi)
            ),
            self.contribution(self.primary.as_ref(), self.primary.lookup_by_doi(&doi)),
        );

        if registry.is_none() && citation_graph.is_none() && primary.is_none() {
            tracing::debug!(%doi, "No source recognised DOI");
            candidate.is_verified = false;
            return candidate;
        }

        // Ascending trust: later records overwrite earlier ones
        for record in [registry, citation_graph, primary].iter().flatten() {
            merge_record(&mut candidate, record, &self.merge_policy);
        }

        candidate.doi = Some(doi);
        candidate.is_verified = true;
        candidate.bibtex = Some(to_bibtex(&candidate));
        candidate
    }
}
