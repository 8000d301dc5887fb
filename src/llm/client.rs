//! LLM Client abstractions and provider management
//!
//! The search pipeline treats the text-generation service as an opaque remote
//! function: a prompt goes in, text comes out, and rate-limit failures are
//! distinguishable from every other failure. Providers:
//! - **OpenAI**: any OpenAI-compatible chat completions endpoint, with
//!   web-search augmentation where the endpoint supports it
//! - **Ollama**: local inference, no web search

use crate::llm::sharding::select_shard;
use crate::types::{AppError, Result};
use crate::utils::toml_config::{LlmConfig, LlmProviderKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Per-call generation switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Let the model consult a web-search tool while answering
    pub web_search: bool,
}

impl GenerateOptions {
    pub fn with_web_search() -> Self {
        Self { web_search: true }
    }
}

/// Generic LLM client trait for provider abstraction
///
/// All LLM providers implement this trait, allowing for easy swapping
/// between providers without changing application code. Implementations
/// must return [`AppError::RateLimited`] for rate-limit responses so callers
/// can retry them.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Generate a completion from a prompt
    async fn generate(&self, prompt: &str, options: GenerateOptions) -> Result<String>;

    /// Generate with system prompt
    async fn generate_with_system(
        &self,
        system: &str,
        prompt: &str,
        options: GenerateOptions,
    ) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI-compatible chat completions API
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4o-search-preview".to_string(),
    ///     timeout: Duration::from_secs(120),
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        timeout: Duration,
    },

    /// Ollama local LLM provider
    Ollama { base_url: String, model: String },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the provider was compiled out or the
    /// underlying HTTP client cannot be built.
    pub fn create_client(&self) -> Result<Arc<dyn LLMClient>> {
        match self {
            #[cfg(feature = "openai")]
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                timeout,
            } => Ok(Arc::new(super::openai::OpenAIClient::new(
                api_key.clone(),
                api_base.clone(),
                model.clone(),
                *timeout,
            )?)),

            #[cfg(feature = "ollama")]
            Provider::Ollama { base_url, model } => Ok(Arc::new(
                super::ollama::OllamaClient::new(base_url.clone(), model.clone()),
            )),

            #[allow(unreachable_patterns)]
            other => Err(AppError::Configuration(format!(
                "{} provider support was not compiled in; enable the '{}' feature",
                other.name(),
                other.name().to_lowercase()
            ))),
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }
}

/// Client factory holding one client per configured credential.
///
/// Work is spread across credentials deterministically with
/// [`select_shard`], so the same `(purpose, id)` pair always lands on the
/// same key.
///
/// # Example
///
/// ```rust,ignore
/// let factory = LLMClientFactory::from_config(&config.llm)?;
/// let client = factory.client_for("search-agent", "Journal Scout");
/// ```
pub struct LLMClientFactory {
    clients: Vec<Arc<dyn LLMClient>>,
}

impl LLMClientFactory {
    /// Build a factory from already constructed clients.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `clients` is empty.
    pub fn from_clients(clients: Vec<Arc<dyn LLMClient>>) -> Result<Self> {
        if clients.is_empty() {
            return Err(AppError::Configuration(
                "at least one LLM client is required".to_string(),
            ));
        }
        Ok(Self { clients })
    }

    /// Build one client per credential listed in the `[llm]` section.
    ///
    /// Missing credentials are reported here, once, rather than on every call.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let providers: Vec<Provider> = match config.provider {
            LlmProviderKind::OpenAI => config
                .resolve_api_keys()?
                .into_iter()
                .map(|api_key| Provider::OpenAI {
                    api_key,
                    api_base: config.api_base.clone(),
                    model: config.model.clone(),
                    timeout,
                })
                .collect(),
            LlmProviderKind::Ollama => vec![Provider::Ollama {
                base_url: config.api_base.clone(),
                model: config.model.clone(),
            }],
        };

        let clients = providers
            .iter()
            .map(Provider::create_client)
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            "Created {} LLM client(s) for model {}",
            clients.len(),
            config.model
        );

        Self::from_clients(clients)
    }

    /// Client responsible for `(purpose, id)`.
    pub fn client_for(&self, purpose: &str, id: &str) -> Arc<dyn LLMClient> {
        let index = select_shard(purpose, id, self.clients.len());
        Arc::clone(&self.clients[index])
    }

    /// Number of credential shards
    pub fn shard_count(&self) -> usize {
        self.clients.len()
    }
}
