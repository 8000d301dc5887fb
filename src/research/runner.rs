//! Runs a single search agent.

use super::agents::{build_agent_prompt, AGENT_SYSTEM_PROMPT};
use super::parser::parse_candidates;
use crate::llm::{GenerateOptions, LLMClientFactory};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::types::{AgentDescriptor, AppError, Reference, Result};
use std::sync::Arc;
use std::time::Duration;

/// Purpose string used to shard agent calls across credentials
const SEARCH_PURPOSE: &str = "search-agent";

/// Bounded retry for rate-limited generation calls.
///
/// `max_attempts` counts every call, including the first. Before attempt
/// `n + 1` the runner sleeps `backoff_step * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

pub struct AgentRunner {
    factory: Arc<LLMClientFactory>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl AgentRunner {
    pub fn new(factory: Arc<LLMClientFactory>, retry: RetryPolicy, timeout: Duration) -> Self {
        Self {
            factory,
            retry,
            timeout,
        }
    }

    /// Run `descriptor` against `topic`.
    ///
    /// Never fails: any unrecoverable error is reported as `AgentFailed`
    /// and yields no candidates.
    pub async fn run(
        &self,
        descriptor: &AgentDescriptor,
        topic: &str,
        context: &str,
        include_preprints: bool,
        progress: &dyn ProgressSink,
    ) -> Vec<Reference> {
        progress.emit(ProgressEvent::AgentStarted {
            agent: descriptor.name.clone(),
        });

        let prompt = build_agent_prompt(descriptor, topic, context, include_preprints);
        let text = match self.generate_with_retry(descriptor, &prompt, progress).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(agent = %descriptor.name, error = %e, "Search agent failed");
                progress.emit(ProgressEvent::AgentFailed {
                    agent: descriptor.name.clone(),
                    error: e.to_string(),
                });
                return Vec::new();
            }
        };

        let allow_preprints = descriptor.preprint_policy.allows_preprints(include_preprints);
        let candidates: Vec<Reference> = parse_candidates(&text, &descriptor.name)
            .into_iter()
            .filter(|candidate| allow_preprints || !candidate.is_preprint)
            .collect();

        tracing::info!(
            agent = %descriptor.name,
            candidates = candidates.len(),
            "Search agent finished"
        );
        progress.emit(ProgressEvent::AgentFinished {
            agent: descriptor.name.clone(),
            candidates: candidates.len(),
        });
        candidates
    }

    async fn generate_with_retry(
        &self,
        descriptor: &AgentDescriptor,
        prompt: &str,
        progress: &dyn ProgressSink,
    ) -> Result<String> {
        let client = self.factory.client_for(SEARCH_PURPOSE, &descriptor.name);
        let options = GenerateOptions::with_web_search();
        let mut attempt = 1;

        loop {
            let call = client.generate_with_system(AGENT_SYSTEM_PROMPT, prompt, options);
            let outcome = match tokio::time::timeout(self.timeout, call).await {
                Ok(result) => result,
                Err(_) => Err(AppError::Timeout(format!(
                    "agent '{}' did not answer within {}s",
                    descriptor.name,
                    self.timeout.as_secs()
                ))),
            };

            match outcome {
                Err(e) if e.is_rate_limited() && attempt < self.retry.max_attempts => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::debug!(
                        agent = %descriptor.name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, backing off"
                    );
                    progress.emit(ProgressEvent::AgentRetrying {
                        agent: descriptor.name.clone(),
                        attempt,
                        delay_ms: delay.as_millis() as u64,
                    });
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}
