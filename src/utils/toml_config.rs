//! TOML-based configuration for papyrus
//!
//! This module provides declarative configuration for the text-generation
//! provider, the bibliographic sources, the search agent roster and the
//! validator via a TOML file (`papyrus.toml`).
//!
//! Secrets never live in the file: it names the environment variables that
//! hold them, and `.env` files are honoured through `dotenvy`.

use crate::research::agents::default_roster;
use crate::research::filter::QualityFilter;
use crate::types::{AgentDescriptor, AppError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Root configuration structure loaded from papyrus.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PapyrusConfig {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub validation: ValidationConfig,
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProviderKind,

    /// Chat completions base URL (or the Ollama server URL)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variables holding API keys; several keys are sharded
    #[serde(default = "default_api_key_envs")]
    pub api_key_envs: Vec<String>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-search-preview".to_string()
}

fn default_api_key_envs() -> Vec<String> {
    vec!["OPENAI_API_KEY".to_string()]
}

fn default_llm_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            api_base: default_api_base(),
            model: default_model(),
            api_key_envs: default_api_key_envs(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    /// Read every configured API key from the process environment.
    pub fn resolve_api_keys(&self) -> Result<Vec<String>, ConfigError> {
        self.resolve_api_keys_with(|name| std::env::var(name).ok())
    }

    /// Read API keys through `lookup`; unset or blank variables are skipped.
    ///
    /// Fails when no key at all could be found.
    pub fn resolve_api_keys_with<F>(&self, lookup: F) -> Result<Vec<String>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let keys: Vec<String> = self
            .api_key_envs
            .iter()
            .filter_map(|name| lookup(name))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();

        if keys.is_empty() {
            return Err(ConfigError::MissingEnvVar(self.api_key_envs.join(", ")));
        }
        Ok(keys)
    }
}

// ============= Bibliographic Source Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_openalex_base")]
    pub openalex_base: String,

    #[serde(default = "default_semantic_scholar_base")]
    pub semantic_scholar_base: String,

    #[serde(default = "default_crossref_base")]
    pub crossref_base: String,

    /// Environment variable with a contact address for polite API pools
    #[serde(default = "default_mailto_env")]
    pub mailto_env: Option<String>,

    /// Environment variable with a Semantic Scholar API key
    #[serde(default = "default_semantic_scholar_key_env")]
    pub semantic_scholar_key_env: Option<String>,

    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

fn default_openalex_base() -> String {
    "https://api.openalex.org".to_string()
}

fn default_semantic_scholar_base() -> String {
    "https://api.semanticscholar.org/graph/v1".to_string()
}

fn default_crossref_base() -> String {
    "https://api.crossref.org".to_string()
}

fn default_mailto_env() -> Option<String> {
    Some("PAPYRUS_MAILTO".to_string())
}

fn default_semantic_scholar_key_env() -> Option<String> {
    Some("S2_API_KEY".to_string())
}

fn default_source_timeout() -> u64 {
    8
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            openalex_base: default_openalex_base(),
            semantic_scholar_base: default_semantic_scholar_base(),
            crossref_base: default_crossref_base(),
            mailto_env: default_mailto_env(),
            semantic_scholar_key_env: default_semantic_scholar_key_env(),
            timeout_secs: default_source_timeout(),
        }
    }
}

impl SourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn mailto(&self) -> Option<String> {
        resolve_optional_env(self.mailto_env.as_deref())
    }

    pub fn semantic_scholar_key(&self) -> Option<String> {
        resolve_optional_env(self.semantic_scholar_key_env.as_deref())
    }
}

fn resolve_optional_env(name: Option<&str>) -> Option<String> {
    name.and_then(|name| std::env::var(name).ok())
        .filter(|value| !value.trim().is_empty())
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Delay between agent launches, to smooth bursts against the rate limiter
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,

    /// Total attempts per agent when rate limited
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff before retry `n` is `n * backoff_step_secs`
    #[serde(default = "default_backoff_step_secs")]
    pub backoff_step_secs: u64,

    #[serde(default = "default_roster")]
    pub agents: Vec<AgentDescriptor>,
}

fn default_stagger_ms() -> u64 {
    1500
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_step_secs() -> u64 {
    2
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            stagger_ms: default_stagger_ms(),
            max_attempts: default_max_attempts(),
            backoff_step_secs: default_backoff_step_secs(),
            agents: default_roster(),
        }
    }
}

// ============= Validation Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum concurrent resolutions; absent means unbounded
    #[serde(default)]
    pub max_concurrency: Option<usize>,

    /// Abstracts must be longer than this to replace an existing one
    #[serde(default = "default_min_abstract_len")]
    pub min_abstract_len: usize,

    /// Which references survive the final quality filter
    #[serde(default)]
    pub quality_filter: QualityFilter,
}

fn default_min_abstract_len() -> usize {
    50
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_concurrency: None,
            min_abstract_len: default_min_abstract_len(),
            quality_filter: QualityFilter::default(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable(s) '{0}' referenced in config are not set")]
    MissingEnvVar(String),
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

impl PapyrusConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config: PapyrusConfig = toml::from_str(&content)?;
        config.validate()?;

        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            debug!("No configuration at {:?}, using defaults", path);
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    /// Validate the configuration for internal consistency.
    ///
    /// Credentials are checked separately, when clients are built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.model must not be empty".to_string(),
            ));
        }
        if self.llm.provider == LlmProviderKind::OpenAI && self.llm.api_key_envs.is_empty() {
            return Err(ConfigError::ValidationError(
                "llm.api_key_envs must name at least one variable".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 || self.sources.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.search.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "search.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.validation.max_concurrency == Some(0) {
            return Err(ConfigError::ValidationError(
                "validation.max_concurrency must be at least 1 when set".to_string(),
            ));
        }
        if self.search.agents.is_empty() {
            return Err(ConfigError::ValidationError(
                "search.agents must contain at least one agent".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for agent in &self.search.agents {
            if agent.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "agent names must not be empty".to_string(),
                ));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate agent name '{}'",
                    agent.name
                )));
            }
        }

        Ok(())
    }
}
