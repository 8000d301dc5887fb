//! Crossref REST API client (DOI registry source).
//!
//! Crossref knows every registered DOI but its metadata is publisher-supplied
//! and uneven, so it sits at the bottom of the trust order.

use super::{clean, doi_path, BibliographicSource, SourceHttp};
use crate::citations::doi::normalize_doi;
use crate::types::{Result, SourceRecord};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

const PROVIDER: &str = "Crossref";

pub struct CrossrefClient {
    http: SourceHttp,
    base_url: String,
    mailto: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkEnvelope {
    message: CrossrefWork,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CrossrefWork {
    #[serde(rename = "DOI")]
    doi: Option<String>,
    #[serde(default)]
    title: Vec<String>,
    #[serde(default)]
    container_title: Vec<String>,
    #[serde(default)]
    author: Vec<CrossrefAuthor>,
    issued: Option<DateParts>,
    published: Option<DateParts>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    is_referenced_by_count: Option<u64>,
    #[serde(rename = "URL")]
    url: Option<String>,
    #[serde(default)]
    subject: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CrossrefAuthor {
    given: Option<String>,
    family: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DateParts {
    #[serde(rename = "date-parts", default)]
    date_parts: Vec<Vec<Option<i32>>>,
}

impl DateParts {
    fn year(&self) -> Option<i32> {
        self.date_parts.first()?.first().copied().flatten()
    }
}

impl CrossrefAuthor {
    fn display_name(self) -> Option<String> {
        match (clean(self.given), clean(self.family)) {
            (Some(given), Some(family)) => Some(format!("{} {}", given, family)),
            (None, Some(family)) => Some(family),
            _ => clean(self.name),
        }
    }
}

/// Strip JATS/HTML markup from a Crossref abstract.
pub(crate) fn strip_markup(text: &str) -> String {
    static TAGS: OnceLock<Regex> = OnceLock::new();
    let tags = TAGS.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern is a valid regex"));
    tags.replace_all(text, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

impl CrossrefClient {
    pub fn new(base_url: impl Into<String>, mailto: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: SourceHttp::new(PROVIDER, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            mailto,
        })
    }
}

impl From<CrossrefWork> for SourceRecord {
    fn from(work: CrossrefWork) -> Self {
        let year = work
            .issued
            .as_ref()
            .and_then(DateParts::year)
            .or_else(|| work.published.as_ref().and_then(DateParts::year));

        SourceRecord {
            doi: work.doi.as_deref().and_then(normalize_doi),
            title: clean(work.title.into_iter().next()),
            year: year.map(|year| year.to_string()),
            venue: clean(work.container_title.into_iter().next()),
            authors: work
                .author
                .into_iter()
                .filter_map(CrossrefAuthor::display_name)
                .collect(),
            abstract_text: clean(work.abstract_text.map(|text| strip_markup(&text))),
            fields_of_study: work.subject,
            url: clean(work.url),
            citation_count: work.is_referenced_by_count,
        }
    }
}

#[async_trait]
impl BibliographicSource for CrossrefClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn lookup_by_doi(&self, doi: &str) -> Result<Option<SourceRecord>> {
        let mut request = self
            .http
            .client()
            .get(format!("{}/works/{}", self.base_url, doi_path(doi)));
        if let Some(mailto) = &self.mailto {
            request = request.query(&[("mailto", mailto.as_str())]);
        }

        let envelope: Option<WorkEnvelope> = self.http.fetch_json(request).await?;
        Ok(envelope.map(|envelope| SourceRecord::from(envelope.message)))
    }
}
