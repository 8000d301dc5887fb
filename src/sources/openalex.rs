//! OpenAlex client: the primary index, and the only source used for
//! title-based DOI discovery.

use super::{clean, doi_path, BibliographicSource, SourceHttp};
use crate::citations::doi::normalize_doi;
use crate::types::{Result, SourceRecord};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const PROVIDER: &str = "OpenAlex";

/// Concepts at this level or shallower count as fields of study
const MAX_CONCEPT_LEVEL: u32 = 1;

pub struct OpenAlexClient {
    http: SourceHttp,
    base_url: String,
    mailto: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkList {
    #[serde(default)]
    results: Vec<Work>,
}

#[derive(Debug, Deserialize)]
struct Work {
    doi: Option<String>,
    title: Option<String>,
    display_name: Option<String>,
    publication_year: Option<i32>,
    primary_location: Option<Location>,
    #[serde(default)]
    authorships: Vec<Authorship>,
    abstract_inverted_index: Option<HashMap<String, Vec<usize>>>,
    cited_by_count: Option<u64>,
    #[serde(default)]
    concepts: Vec<Concept>,
}

#[derive(Debug, Deserialize)]
struct Location {
    source: Option<LocationSource>,
    landing_page_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocationSource {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Authorship {
    author: Option<Author>,
}

#[derive(Debug, Deserialize)]
struct Author {
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Concept {
    display_name: Option<String>,
    level: Option<u32>,
}

impl OpenAlexClient {
    pub fn new(base_url: impl Into<String>, mailto: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: SourceHttp::new(PROVIDER, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            mailto,
        })
    }

    fn with_mailto(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.mailto {
            Some(mailto) => request.query(&[("mailto", mailto.as_str())]),
            None => request,
        }
    }
}

/// Rebuild plain text from OpenAlex's `word -> positions` abstract encoding.
pub(crate) fn reconstruct_abstract(index: &HashMap<String, Vec<usize>>) -> Option<String> {
    let mut positioned: Vec<(usize, &str)> = index
        .iter()
        .flat_map(|(word, positions)| positions.iter().map(move |&pos| (pos, word.as_str())))
        .collect();
    if positioned.is_empty() {
        return None;
    }

    positioned.sort_by_key(|(pos, _)| *pos);
    Some(
        positioned
            .into_iter()
            .map(|(_, word)| word)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

impl From<Work> for SourceRecord {
    fn from(work: Work) -> Self {
        let (venue, url) = match work.primary_location {
            Some(location) => (
                location.source.and_then(|source| source.display_name),
                location.landing_page_url,
            ),
            None => (None, None),
        };

        SourceRecord {
            doi: work.doi.as_deref().and_then(normalize_doi),
            title: clean(work.title.or(work.display_name)),
            year: work.publication_year.map(|year| year.to_string()),
            venue: clean(venue),
            authors: work
                .authorships
                .into_iter()
                .filter_map(|authorship| clean(authorship.author?.display_name))
                .collect(),
            abstract_text: work
                .abstract_inverted_index
                .as_ref()
                .and_then(reconstruct_abstract),
            fields_of_study: work
                .concepts
                .into_iter()
                .filter(|concept| concept.level.is_some_and(|level| level <= MAX_CONCEPT_LEVEL))
                .filter_map(|concept| clean(concept.display_name))
                .collect(),
            url: clean(url),
            citation_count: work.cited_by_count,
        }
    }
}

#[async_trait]
impl BibliographicSource for OpenAlexClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn lookup_by_doi(&self, doi: &str) -> Result<Option<SourceRecord>> {
        let request = self
            .http
            .client()
            .get(format!("{}/works/doi:{}", self.base_url, doi_path(doi)));

        let work: Option<Work> = self.http.fetch_json(self.with_mailto(request)).await?;
        Ok(work.map(SourceRecord::from))
    }

    async fn search_by_title(&self, title: &str) -> Result<Option<SourceRecord>> {
        let request = self
            .http
            .client()
            .get(format!("{}/works", self.base_url))
            .query(&[("search", title), ("per-page", "1")]);

        let list: Option<WorkList> = self.http.fetch_json(self.with_mailto(request)).await?;
        Ok(list
            .and_then(|list| list.results.into_iter().next())
            .map(SourceRecord::from))
    }
}
