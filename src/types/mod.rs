use serde::{Deserialize, Serialize};

/// Placeholder author used when an agent supplies no author list.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Placeholder year used when an agent supplies no publication year.
pub const UNKNOWN_YEAR: &str = "n.d.";

// ============= Reference Types =============

/// A citation flowing through the pipeline.
///
/// Search agents create references as unverified candidates; the resolver
/// enriches the same value in place with authoritative metadata. The
/// enrichment fields (`citation_count`, `abstract_text`, `fields_of_study`,
/// `bibtex`) stay empty until a bibliographic source supplies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub title: String,
    pub authors: Vec<String>,
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    /// Name of the agent or provider that produced this reference
    pub source: String,
    #[serde(default)]
    pub is_preprint: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<u64>,
    #[serde(
        default,
        rename = "abstract",
        skip_serializing_if = "Option::is_none"
    )]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields_of_study: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bibtex: Option<String>,
    /// Assigned once when drafting begins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_key: Option<String>,
}

impl Reference {
    /// Create an unverified candidate with the given title and provenance.
    pub fn candidate(title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            authors: vec![UNKNOWN_AUTHOR.to_string()],
            year: UNKNOWN_YEAR.to_string(),
            doi: None,
            url: None,
            venue: None,
            source: source.into(),
            is_preprint: false,
            is_verified: false,
            snippet: None,
            citation_count: None,
            abstract_text: None,
            fields_of_study: None,
            bibtex: None,
            citation_key: None,
        }
    }

    pub fn with_doi(mut self, doi: impl Into<String>) -> Self {
        self.doi = Some(doi.into());
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    /// True when the DOI field holds something that looks like a DOI.
    ///
    /// This is the loose check used by the quality filter, not full
    /// normalization.
    pub fn has_doi_shape(&self) -> bool {
        self.doi.as_deref().is_some_and(|doi| doi.contains("10."))
    }
}

/// Normalized bibliographic metadata returned by one source for one work.
///
/// Every field is optional: sources differ widely in what they know, and
/// the merge step only lets non-empty values through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub doi: Option<String>,
    pub title: Option<String>,
    pub year: Option<String>,
    pub venue: Option<String>,
    pub authors: Vec<String>,
    pub abstract_text: Option<String>,
    pub fields_of_study: Vec<String>,
    pub url: Option<String>,
    pub citation_count: Option<u64>,
}

// ============= Agent Types =============

/// Whether a search agent honours the session's preprint setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PreprintPolicy {
    /// Never return preprints, whatever the session asks for
    Exclude,
    /// Include preprints exactly when the session does
    #[default]
    FollowSession,
}

impl PreprintPolicy {
    pub fn allows_preprints(self, include_preprints: bool) -> bool {
        match self {
            PreprintPolicy::Exclude => false,
            PreprintPolicy::FollowSession => include_preprints,
        }
    }
}

/// Static configuration for one specialised search agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDescriptor {
    pub name: String,
    /// Natural-language constraint injected into the agent prompt
    #[serde(rename = "focus")]
    pub focus_constraint: String,
    #[serde(default)]
    pub preprint_policy: PreprintPolicy,
}

impl AgentDescriptor {
    pub fn new(
        name: impl Into<String>,
        focus_constraint: impl Into<String>,
        preprint_policy: PreprintPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            focus_constraint: focus_constraint.into(),
            preprint_policy,
        }
    }
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("{provider} error: {message}")]
    Source {
        provider: &'static str,
        message: String,
    },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the text-generation service asked us to slow down.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::RateLimited(_))
    }

    /// Failure reported by (or while talking to) a bibliographic source.
    pub fn provider(provider: &'static str, message: impl Into<String>) -> Self {
        AppError::Source {
            provider,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else {
            AppError::Internal(format!("HTTP request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
