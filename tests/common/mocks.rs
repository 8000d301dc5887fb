//! Mock implementations for testing.
//!
//! In-memory LLM clients and bibliographic sources shared by the
//! integration tests, so no test ever touches the network.

#![allow(dead_code)]

use async_trait::async_trait;
use papyrus::llm::{GenerateOptions, LLMClient};
use papyrus::sources::BibliographicSource;
use papyrus::types::{AppError, Result, SourceRecord};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// What a scripted client does when a rule matches.
#[derive(Clone, Debug)]
pub enum Reply {
    /// Return this text
    Text(String),
    /// Fail with a non-retryable LLM error
    Fail,
    /// Fail with a rate-limit error
    RateLimited,
}

/// Mock LLM client that answers based on the prompt.
///
/// Rules are checked in order; the first rule whose needle occurs in the
/// prompt decides the reply. Prompts matching no rule get `fallback`.
///
/// ```ignore
/// let client = ScriptedLLMClient::new(Reply::Text("[]".into()))
///     .when("peer-reviewed academic journals", Reply::Fail);
/// ```
pub struct ScriptedLLMClient {
    rules: Vec<(String, Reply)>,
    fallback: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    last_options: Mutex<Option<GenerateOptions>>,
}

impl ScriptedLLMClient {
    pub fn new(fallback: Reply) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            last_options: Mutex::new(None),
        }
    }

    /// Client that always returns `text`.
    pub fn always(text: &str) -> Self {
        Self::new(Reply::Text(text.to_string()))
    }

    pub fn when(mut self, needle: &str, reply: Reply) -> Self {
        self.rules.push((needle.to_string(), reply));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn last_options(&self) -> Option<GenerateOptions> {
        *self.last_options.lock()
    }

    fn reply_for(&self, prompt: &str) -> Reply {
        self.rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

#[async_trait]
impl LLMClient for ScriptedLLMClient {
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());
        *self.last_options.lock() = Some(options);

        match self.reply_for(prompt) {
            Reply::Text(text) => Ok(text),
            Reply::Fail => Err(AppError::LLM("Mock LLM failure".to_string())),
            Reply::RateLimited => Err(AppError::RateLimited("429 Too Many Requests".to_string())),
        }
    }

    async fn generate_with_system(
        &self,
        _system: &str,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<String> {
        self.generate(prompt, options).await
    }

    fn model_name(&self) -> &str {
        "scripted-mock"
    }
}

/// In-memory bibliographic source.
#[derive(Default)]
pub struct StaticSource {
    name: &'static str,
    by_doi: HashMap<String, SourceRecord>,
    by_title: HashMap<String, SourceRecord>,
    delays: HashMap<String, Duration>,
    failing: bool,
    doi_lookups: AtomicUsize,
}

impl StaticSource {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    /// Source whose every lookup errors.
    pub fn failing(name: &'static str) -> Self {
        Self {
            name,
            failing: true,
            ..Default::default()
        }
    }

    pub fn with_record(mut self, doi: &str, record: SourceRecord) -> Self {
        self.by_doi.insert(doi.to_string(), record);
        self
    }

    /// Title search hit, keyed by the exact query string.
    pub fn with_title_hit(mut self, title: &str, record: SourceRecord) -> Self {
        self.by_title.insert(title.to_string(), record);
        self
    }

    /// Delay DOI lookups for `doi` by `delay`.
    pub fn with_delay(mut self, doi: &str, delay: Duration) -> Self {
        self.delays.insert(doi.to_string(), delay);
        self
    }

    pub fn doi_lookups(&self) -> usize {
        self.doi_lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BibliographicSource for StaticSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn lookup_by_doi(&self, doi: &str) -> Result<Option<SourceRecord>> {
        self.doi_lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(doi) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing {
            return Err(AppError::provider(self.name, "connection refused"));
        }
        Ok(self.by_doi.get(doi).cloned())
    }

    async fn search_by_title(&self, title: &str) -> Result<Option<SourceRecord>> {
        if self.failing {
            return Err(AppError::provider(self.name, "connection refused"));
        }
        Ok(self.by_title.get(title).cloned())
    }
}

/// Record carrying only a title and DOI.
pub fn record(doi: &str, title: &str) -> SourceRecord {
    SourceRecord {
        doi: Some(doi.to_string()),
        title: Some(title.to_string()),
        ..Default::default()
    }
}
