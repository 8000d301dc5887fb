//! Multi-Agent Literature Search
//!
//! A search fans one query out to a roster of specialised LLM "scouts",
//! each constrained to a different slice of the literature, then reconciles
//! what they claim to have found.
//!
//! # Architecture
//!
//! - [`agents`] - the default roster and agent prompts
//! - [`runner::AgentRunner`] - one agent call with bounded rate-limit retry
//! - [`parser`] - defensive extraction of candidates from model output
//! - [`dedup`] - normalized-title deduplication
//! - [`filter::QualityFilter`] - the final keep/drop policy
//! - [`orchestrator::SearchOrchestrator`] - ties it all together
//!
//! # Usage
//!
//! ```ignore
//! use papyrus::research::SearchOrchestrator;
//! use papyrus::utils::toml_config::PapyrusConfig;
//!
//! let config = PapyrusConfig::load_or_default("papyrus.toml")?;
//! let orchestrator = SearchOrchestrator::from_config(&config)?;
//!
//! let references = orchestrator
//!     .search("graph neural networks for drug discovery", false, papyrus::progress::noop())
//!     .await;
//! ```
//!
//! # Search Workflow
//!
//! 1. **Fan-out** - every agent runs concurrently, optionally staggered
//! 2. **Flatten** - outputs are tagged with the producing agent and combined
//! 3. **Dedup** - the first candidate per normalized title wins
//! 4. **Validate** - each candidate is resolved against bibliographic sources
//! 5. **Filter** - the quality filter decides what the user gets to curate
//!
//! A failing agent contributes nothing; it never fails the search.

pub mod agents;
pub mod dedup;
pub mod filter;
pub mod orchestrator;
pub mod parser;
pub mod runner;

pub use dedup::{dedupe_by_title, normalize_title_key};
pub use filter::{QualityFilter, SearchSummary};
pub use orchestrator::{SearchOrchestrator, SearchSession};
pub use parser::{parse_agent_output, ParseResult};
pub use runner::{AgentRunner, RetryPolicy};
