//! Semantic Scholar Graph API client (citation graph source).

use super::{clean, doi_path, BibliographicSource, SourceHttp};
use crate::citations::doi::normalize_doi;
use crate::types::{Result, SourceRecord};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const PROVIDER: &str = "Semantic Scholar";

const PAPER_FIELDS: &str =
    "title,year,venue,authors,abstract,citationCount,fieldsOfStudy,url,externalIds";

pub struct SemanticScholarClient {
    http: SourceHttp,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Paper {
    title: Option<String>,
    year: Option<i32>,
    venue: Option<String>,
    #[serde(default)]
    authors: Vec<PaperAuthor>,
    #[serde(rename = "abstract")]
    abstract_text: Option<String>,
    citation_count: Option<u64>,
    fields_of_study: Option<Vec<String>>,
    url: Option<String>,
    external_ids: Option<ExternalIds>,
}

#[derive(Debug, Deserialize)]
struct PaperAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExternalIds {
    #[serde(rename = "DOI")]
    doi: Option<String>,
}

impl SemanticScholarClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: SourceHttp::new(PROVIDER, timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

impl From<Paper> for SourceRecord {
    fn from(paper: Paper) -> Self {
        SourceRecord {
            doi: paper
                .external_ids
                .and_then(|ids| ids.doi)
                .as_deref()
                .and_then(normalize_doi),
            title: clean(paper.title),
            year: paper.year.map(|year| year.to_string()),
            venue: clean(paper.venue),
            authors: paper
                .authors
                .into_iter()
                .filter_map(|author| clean(author.name))
                .collect(),
            abstract_text: clean(paper.abstract_text),
            fields_of_study: paper.fields_of_study.unwrap_or_default(),
            url: clean(paper.url),
            citation_count: paper.citation_count,
        }
    }
}

#[async_trait]
impl BibliographicSource for SemanticScholarClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn lookup_by_doi(&self, doi: &str) -> Result<Option<SourceRecord>> {
        let mut request = self
            .http
            .client()
            .get(format!("{}/paper/DOI:{}", self.base_url, doi_path(doi)))
            .query(&[("fields", PAPER_FIELDS)]);
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let paper: Option<Paper> = self.http.fetch_json(request).await?;
        Ok(paper.map(SourceRecord::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_lookup_maps_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paper/DOI:10.1000/xyz"))
            .and(query_param("fields", PAPER_FIELDS))
            .and(header("x-api-key", "s2-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "paperId": "abc",
                "title": "Deep Residual Learning",
                "year": 2016,
                "venue": "",
                "authors": [{"authorId": "1", "name": "Kaiming He"}],
                "abstract": null,
                "citationCount": 150000,
                "fieldsOfStudy": ["Computer Science"],
                "url": "https://www.semanticscholar.org/paper/abc",
                "externalIds": {"DOI": "10.1000/XYZ"}
            })))
            .mount(&server)
            .await;

        let client = SemanticScholarClient::new(
            server.uri(),
            Some("s2-key".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let record = client.lookup_by_doi("10.1000/xyz").await.unwrap().unwrap();

        assert_eq!(record.title.as_deref(), Some("Deep Residual Learning"));
        assert_eq!(record.year.as_deref(), Some("2016"));
        assert_eq!(record.venue, None);
        assert_eq!(record.authors, vec!["Kaiming He".to_string()]);
        assert_eq!(record.abstract_text, None);
        assert_eq!(record.citation_count, Some(150000));
        assert_eq!(record.doi.as_deref(), Some("10.1000/xyz"));
    }

    #[tokio::test]
    async fn test_missing_paper_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Paper not found"})))
            .mount(&server)
            .await;

        let client = SemanticScholarClient::new(server.uri(), None, Duration::from_secs(5)).unwrap();
        assert!(client.lookup_by_doi("10.1000/none").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_title_search_unsupported() {
        let client =
            SemanticScholarClient::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        assert!(client.search_by_title("anything").await.unwrap().is_none());
    }
}
