//! Bibliographic Metadata Sources
//!
//! Authoritative metadata comes from three independent services, ranked by
//! how much the resolver trusts them:
//!
//! | Role | Client | Trust |
//! |------|--------|-------|
//! | DOI registry | [`crossref::CrossrefClient`] | lowest |
//! | Citation graph | [`semantic_scholar::SemanticScholarClient`] | middle |
//! | Primary index (also title search) | [`openalex::OpenAlexClient`] | highest |
//!
//! All clients implement [`BibliographicSource`]. A missing work is
//! `Ok(None)`; transport and decoding problems are `Err`, which the resolver
//! downgrades to "no contribution".

pub mod crossref;
pub mod openalex;
pub mod semantic_scholar;

use crate::types::{AppError, Result, SourceRecord};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub use crossref::CrossrefClient;
pub use openalex::OpenAlexClient;
pub use semantic_scholar::SemanticScholarClient;

/// A bibliographic metadata provider.
#[async_trait]
pub trait BibliographicSource: Send + Sync {
    /// Short provider name used in logs and errors
    fn name(&self) -> &'static str;

    /// Look up a work by its normalized DOI.
    async fn lookup_by_doi(&self, doi: &str) -> Result<Option<SourceRecord>>;

    /// Best match for a free-text title, if the provider supports searching.
    async fn search_by_title(&self, _title: &str) -> Result<Option<SourceRecord>> {
        Ok(None)
    }
}

/// HTTP plumbing shared by the source clients.
#[derive(Debug, Clone)]
pub(crate) struct SourceHttp {
    client: reqwest::Client,
    provider: &'static str,
}

impl SourceHttp {
    pub(crate) fn new(provider: &'static str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("papyrus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                AppError::Configuration(format!("Failed to build {} HTTP client: {}", provider, e))
            })?;

        Ok(Self { client, provider })
    }

    pub(crate) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Send `request` and decode the JSON body; 404 means "not found".
    pub(crate) async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Option<T>> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(format!("{} request timed out", self.provider))
            } else {
                AppError::provider(self.provider, format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::provider(
                self.provider,
                format!("unexpected status {}", status),
            ));
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| AppError::provider(self.provider, format!("malformed payload: {}", e)))
    }
}

/// Characters a DOI may contain that would otherwise end or corrupt a URL path.
/// `/` stays literal since every provider routes `prefix/suffix` as-is.
const DOI_PATH_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// `doi` escaped for use inside a request path.
pub(crate) fn doi_path(doi: &str) -> String {
    utf8_percent_encode(doi, DOI_PATH_SET).to_string()
}

/// Trimmed, non-empty copy of `value`.
pub(crate) fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doi_path_escapes_url_delimiters() {
        assert_eq!(doi_path("10.1038/nature14539"), "10.1038/nature14539");
        assert_eq!(
            doi_path("10.1002/(sici)1097-4571(199806)49:8<693::aid-asi4>3.0.co;2-o"),
            "10.1002/(sici)1097-4571(199806)49:8%3C693::aid-asi4%3E3.0.co;2-o"
        );
        assert_eq!(doi_path("10.1000/a#b?c"), "10.1000/a%23b%3Fc");
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        assert_eq!(
            clean(Some("  Deep\n  Learning ".to_string())).as_deref(),
            Some("Deep Learning")
        );
        assert_eq!(clean(Some("   ".to_string())), None);
        assert_eq!(clean(None), None);
    }
}
