//! LLM Provider Clients and Abstractions
//!
//! This module provides a unified interface for the text-generation service
//! used by the search agents. Provider-specific code sits behind the
//! [`LLMClient`] trait so the rest of the pipeline (and its tests) never
//! depends on a particular vendor.
//!
//! # Architecture
//!
//! - [`LLMClient`] - The core trait that all providers implement
//! - [`Provider`] - Runtime provider selection
//! - [`LLMClientFactory`] - One client per credential, sharded by [`select_shard`]
//!
//! # Supported Providers
//!
//! Enable providers via Cargo features:
//! - `openai` - OpenAI-compatible chat completions endpoints
//! - `ollama` - Local Ollama server
//!
//! # Example
//!
//! ```ignore
//! use papyrus::llm::{GenerateOptions, LLMClientFactory};
//!
//! let factory = LLMClientFactory::from_config(&config.llm)?;
//! let client = factory.client_for("search-agent", "Journal Scout");
//! let text = client.generate("List three papers on X", GenerateOptions::with_web_search()).await?;
//! ```

/// Core LLM client trait, provider selection and client factory.
pub mod client;
/// Hash-based selection of a credential shard.
pub mod sharding;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

pub use client::{GenerateOptions, LLMClient, LLMClientFactory, Provider};
pub use sharding::select_shard;
