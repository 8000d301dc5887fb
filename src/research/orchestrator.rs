//! Fans a topic out to the agent roster and turns the merged output into a
//! validated, filtered reference set.

use super::agents::default_roster;
use super::dedup::dedupe_by_title;
use super::filter::QualityFilter;
use super::runner::{AgentRunner, RetryPolicy};
use crate::citations::{BibliographicResolver, ReferenceValidator};
use crate::llm::LLMClientFactory;
use crate::progress::{ProgressEvent, SharedProgress};
use crate::types::{AgentDescriptor, Reference, Result};
use crate::utils::toml_config::PapyrusConfig;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use uuid::Uuid;

/// Everything produced by one orchestration run.
///
/// Sessions are never reused: a new query (or a changed preprint flag)
/// always produces a fresh session.
#[derive(Debug, Clone)]
pub struct SearchSession {
    pub id: Uuid,
    pub query: String,
    pub include_preprints: bool,
    pub started_at: DateTime<Utc>,
    /// Raw candidates per agent, after provenance tagging
    pub agent_results: HashMap<String, Vec<Reference>>,
    pub deduped_candidates: Vec<Reference>,
    pub validated_references: Vec<Reference>,
    /// Survivors of the quality filter
    pub retained_references: Vec<Reference>,
}

/// Fans a query out to the agent roster and turns the combined output into
/// a validated literature set.
pub struct SearchOrchestrator {
    runner: Arc<AgentRunner>,
    validator: ReferenceValidator,
    roster: Vec<AgentDescriptor>,
    stagger: Duration,
    quality_filter: QualityFilter,
}

impl SearchOrchestrator {
    pub fn new(runner: Arc<AgentRunner>, validator: ReferenceValidator) -> Self {
        Self {
            runner,
            validator,
            roster: default_roster(),
            stagger: Duration::from_millis(1500),
            quality_filter: QualityFilter::default(),
        }
    }

    pub fn with_roster(mut self, roster: Vec<AgentDescriptor>) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    pub fn with_quality_filter(mut self, quality_filter: QualityFilter) -> Self {
        self.quality_filter = quality_filter;
        self
    }

    pub fn roster(&self) -> &[AgentDescriptor] {
        &self.roster
    }

    /// Wire up the LLM factory, resolver and validator described by `config`.
    pub fn from_config(config: &PapyrusConfig) -> Result<Self> {
        config.validate()?;

        let factory = Arc::new(LLMClientFactory::from_config(&config.llm)?);
        let retry = RetryPolicy {
            max_attempts: config.search.max_attempts,
            backoff_step: Duration::from_secs(config.search.backoff_step_secs),
        };
        let runner = Arc::new(AgentRunner::new(
            factory,
            retry,
            Duration::from_secs(config.llm.timeout_secs),
        ));

        let resolver = Arc::new(BibliographicResolver::from_config(config)?);
        let validator = ReferenceValidator::new(resolver)
            .with_max_concurrency(config.validation.max_concurrency);

        Ok(Self::new(runner, validator)
            .with_roster(config.search.agents.clone())
            .with_stagger(Duration::from_millis(config.search.stagger_ms))
            .with_quality_filter(config.validation.quality_filter))
    }

    /// Run a search and return the retained references.
    pub async fn search(
        &self,
        topic: &str,
        include_preprints: bool,
        progress: SharedProgress,
    ) -> Vec<Reference> {
        self.run_session(topic, "", include_preprints, progress)
            .await
            .retained_references
    }

    /// Run a full session: fan out, flatten, dedupe, validate, filter.
    pub async fn run_session(
        &self,
        topic: &str,
        context: &str,
        include_preprints: bool,
        progress: SharedProgress,
    ) -> SearchSession {
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        tracing::info!(%id, topic, include_preprints, agents = self.roster.len(), "Starting search");

        let per_agent = self
            .run_agents(topic, context, include_preprints, &progress)
            .await;

        let mut agent_results = HashMap::with_capacity(per_agent.len());
        let mut flattened = Vec::new();
        for (name, mut candidates) in per_agent {
            for candidate in candidates.iter_mut() {
                candidate.source = name.clone();
            }
            flattened.extend(candidates.iter().cloned());
            agent_results.insert(name, candidates);
        }

        let raw = flattened.len();
        let deduped_candidates = dedupe_by_title(flattened);
        tracing::info!(raw, unique = deduped_candidates.len(), "Merged agent candidates");
        progress.emit(ProgressEvent::CandidatesMerged {
            raw,
            unique: deduped_candidates.len(),
        });

        let validated_references = self
            .validator
            .validate_batch(deduped_candidates.clone(), progress.as_ref())
            .await;

        let retained_references = self.quality_filter.apply(validated_references.clone());
        tracing::info!(
            %id,
            retained = retained_references.len(),
            dropped = validated_references.len() - retained_references.len(),
            "Search completed"
        );
        progress.emit(ProgressEvent::SearchCompleted {
            retained: retained_references.len(),
        });

        SearchSession {
            id,
            query: topic.to_string(),
            include_preprints,
            started_at,
            agent_results,
            deduped_candidates,
            validated_references,
            retained_references,
        }
    }

    /// Launch every agent concurrently and return their outputs in roster
    /// order. Agent `i` starts after `stagger * i`.
    async fn run_agents(
        &self,
        topic: &str,
        context: &str,
        include_preprints: bool,
        progress: &SharedProgress,
    ) -> Vec<(String, Vec<Reference>)> {
        let mut set = JoinSet::new();

        for (index, descriptor) in self.roster.iter().cloned().enumerate() {
            let runner = Arc::clone(&self.runner);
            let progress = Arc::clone(progress);
            let topic = topic.to_string();
            let context = context.to_string();
            let delay = self.stagger * index as u32;

            set.spawn(async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let candidates = runner
                    .run(&descriptor, &topic, &context, include_preprints, progress.as_ref())
                    .await;
                (index, descriptor.name, candidates)
            });
        }

        let mut results = Vec::with_capacity(self.roster.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!(error = %e, "Search agent task panicked"),
            }
        }

        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, name, candidates)| (name, candidates))
            .collect()
    }
}
