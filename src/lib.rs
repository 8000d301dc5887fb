//! # Papyrus - Verified Literature Search
//!
//! Papyrus turns a research topic into a verified, citable reference set.
//! A roster of LLM search agents proposes candidate papers; every candidate
//! is then cross-checked against OpenAlex, Semantic Scholar and Crossref
//! before it reaches the user.
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use papyrus::{PapyrusConfig, SearchOrchestrator, SearchSummary};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PapyrusConfig::load_or_default("papyrus.toml")?;
//!     let orchestrator = SearchOrchestrator::from_config(&config)?;
//!
//!     let references = orchestrator
//!         .search("protein structure prediction", false, papyrus::progress::noop())
//!         .await;
//!     println!("{}", SearchSummary::of(&references));
//!     Ok(())
//! }
//! ```
//!
//! ### Resolving a single citation
//!
//! ```rust,ignore
//! use papyrus::{BibliographicResolver, Reference};
//!
//! let resolver = BibliographicResolver::from_config(&config)?;
//! let reference = resolver
//!     .resolve(Reference::candidate("Deep learning", "manual").with_doi("10.1038/nature14539"))
//!     .await;
//! assert!(reference.is_verified);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `openai` | Any OpenAI-compatible chat completions endpoint (default) |
//! | `ollama` | Ollama local inference (default) |
//!
//! ## Modules
//!
//! - [`research`] - Agent fan-out, parsing, dedup and quality filtering
//! - [`citations`] - DOI handling, multi-source resolution, BibTeX
//! - [`sources`] - Bibliographic API clients
//! - [`llm`] - LLM client implementations and credential sharding
//! - [`pipeline`] - Manuscript session state machine
//! - [`progress`] - Push-based progress events
//! - [`types`] - Common types and error handling

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Citation verification: DOIs, merging, resolution, BibTeX.
pub mod citations;
/// Command-line interface.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Manuscript pipeline state machine.
pub mod pipeline;
/// Progress events emitted while searching.
pub mod progress;
/// Multi-agent literature search.
pub mod research;
/// Bibliographic metadata sources.
pub mod sources;
/// Core types (references, agents, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use citations::{BibliographicResolver, ReferenceValidator};
pub use llm::{GenerateOptions, LLMClient, LLMClientFactory, Provider};
pub use pipeline::{Phase, PipelineController, SearchTicket};
pub use progress::{ProgressEvent, ProgressSink};
pub use research::{QualityFilter, SearchOrchestrator, SearchSession, SearchSummary};
pub use sources::BibliographicSource;
pub use types::{AgentDescriptor, AppError, PreprintPolicy, Reference, Result};
pub use utils::toml_config::PapyrusConfig;
