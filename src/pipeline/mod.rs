//! Manuscript Pipeline State
//!
//! [`PipelineController`] sequences a manuscript session:
//!
//! ```text
//! DomainInput -> LiteratureSearch -> Curation -> TopicSynthesis -> Methodology -> Drafting
//! ```
//!
//! The controller never runs a search itself. [`PipelineController::begin_search`]
//! hands out a [`SearchTicket`]; the caller runs the orchestrator with the
//! ticket's parameters and reports back through
//! [`PipelineController::complete_search`]. Every new ticket supersedes the
//! previous one, so results from a search the user has since replaced are
//! ignored when they finally arrive.

use crate::citations::assign_citation_keys;
use crate::research::SearchSummary;
use crate::types::{AppError, Reference, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stage of a manuscript session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    DomainInput,
    LiteratureSearch,
    Curation,
    TopicSynthesis,
    Methodology,
    Drafting,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::DomainInput => "domain input",
            Phase::LiteratureSearch => "literature search",
            Phase::Curation => "curation",
            Phase::TopicSynthesis => "topic synthesis",
            Phase::Methodology => "methodology",
            Phase::Drafting => "drafting",
        };
        f.write_str(name)
    }
}

/// Parameters of one search request, tagged with the generation that
/// issued it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub topic: String,
    pub context: String,
    pub include_preprints: bool,
}

#[derive(Debug)]
pub struct PipelineController {
    phase: Phase,
    generation: u64,
    topic: Option<String>,
    context: String,
    include_preprints: bool,
    literature: Vec<Reference>,
    selected: BTreeSet<usize>,
    bibliography: Vec<Reference>,
    keys_assigned: bool,
}

impl Default for PipelineController {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineController {
    pub fn new() -> Self {
        Self {
            phase: Phase::DomainInput,
            generation: 0,
            topic: None,
            context: String::new(),
            include_preprints: false,
            literature: Vec::new(),
            selected: BTreeSet::new(),
            bibliography: Vec::new(),
            keys_assigned: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn include_preprints(&self) -> bool {
        self.include_preprints
    }

    /// Literature set awaiting curation
    pub fn literature(&self) -> &[Reference] {
        &self.literature
    }

    /// References carried past curation
    pub fn bibliography(&self) -> &[Reference] {
        &self.bibliography
    }

    pub fn summary(&self) -> SearchSummary {
        SearchSummary::of(&self.literature)
    }

    fn issue_ticket(&mut self) -> Result<SearchTicket> {
        let topic = self
            .topic
            .clone()
            .ok_or_else(|| AppError::InvalidInput("no topic has been entered".to_string()))?;

        self.generation += 1;
        self.phase = Phase::LiteratureSearch;
        self.literature.clear();
        self.selected.clear();

        tracing::debug!(generation = self.generation, %topic, "Issued search ticket");
        Ok(SearchTicket {
            generation: self.generation,
            topic,
            context: self.context.clone(),
            include_preprints: self.include_preprints,
        })
    }

    /// Start a literature search for `topic`.
    ///
    /// Allowed from domain input and from the search/curation phases (a new
    /// query replaces the old one).
    pub fn begin_search(
        &mut self,
        topic: impl Into<String>,
        context: impl Into<String>,
    ) -> Result<SearchTicket> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(AppError::InvalidInput("topic must not be empty".to_string()));
        }
        if !matches!(
            self.phase,
            Phase::DomainInput | Phase::LiteratureSearch | Phase::Curation
        ) {
            return Err(AppError::InvalidInput(format!(
                "cannot start a search during {}",
                self.phase
            )));
        }

        self.topic = Some(topic.trim().to_string());
        self.context = context.into();
        self.issue_ticket()
    }

    /// Accept search results for `ticket`.
    ///
    /// Returns `false` (and changes nothing) when the ticket has been
    /// superseded.
    pub fn complete_search(&mut self, ticket: &SearchTicket, references: Vec<Reference>) -> bool {
        if ticket.generation != self.generation || self.phase != Phase::LiteratureSearch {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Ignoring stale search results"
            );
            return false;
        }

        self.literature = references;
        self.selected.clear();
        self.phase = Phase::Curation;
        tracing::info!(summary = %self.summary(), "Literature ready for curation");
        true
    }

    /// Change the preprint setting.
    ///
    /// When a literature set exists or is being searched for, the whole
    /// search is re-run from scratch and a new ticket is returned.
    pub fn set_include_preprints(&mut self, include_preprints: bool) -> Option<SearchTicket> {
        if self.include_preprints == include_preprints {
            return None;
        }
        self.include_preprints = include_preprints;

        if matches!(self.phase, Phase::LiteratureSearch | Phase::Curation) {
            self.issue_ticket().ok()
        } else {
            None
        }
    }

    /// Flip the selection state of literature entry `index`; returns the new state.
    pub fn toggle_selection(&mut self, index: usize) -> Result<bool> {
        if self.phase != Phase::Curation {
            return Err(AppError::InvalidInput(format!(
                "references can only be selected during curation, not {}",
                self.phase
            )));
        }
        if index >= self.literature.len() {
            return Err(AppError::InvalidInput(format!(
                "no reference at index {} ({} available)",
                index,
                self.literature.len()
            )));
        }

        if self.selected.remove(&index) {
            Ok(false)
        } else {
            self.selected.insert(index);
            Ok(true)
        }
    }

    pub fn selected_references(&self) -> Vec<&Reference> {
        self.selected
            .iter()
            .filter_map(|&index| self.literature.get(index))
            .collect()
    }

    /// Move to the next phase.
    pub fn advance(&mut self) -> Result<Phase> {
        let next = match self.phase {
            Phase::DomainInput => {
                return Err(AppError::InvalidInput(
                    "enter a topic and start a search first".to_string(),
                ))
            }
            Phase::LiteratureSearch => {
                return Err(AppError::InvalidInput(
                    "the literature search has not finished".to_string(),
                ))
            }
            Phase::Curation => {
                if self.selected.is_empty() {
                    return Err(AppError::InvalidInput(
                        "select at least one reference".to_string(),
                    ));
                }
                self.bibliography = self
                    .selected
                    .iter()
                    .filter_map(|&index| self.literature.get(index).cloned())
                    .collect();
                // The search session ends here
                self.literature.clear();
                self.selected.clear();
                Phase::TopicSynthesis
            }
            Phase::TopicSynthesis => Phase::Methodology,
            Phase::Methodology => {
                if !self.keys_assigned {
                    assign_citation_keys(&mut self.bibliography);
                    self.keys_assigned = true;
                }
                Phase::Drafting
            }
            Phase::Drafting => {
                return Err(AppError::InvalidInput(
                    "drafting is the final phase".to_string(),
                ))
            }
        };

        tracing::info!(from = %self.phase, to = %next, "Pipeline advanced");
        self.phase = next;
        Ok(next)
    }

    /// Drop the session and return to domain input. Outstanding tickets
    /// become stale.
    pub fn restart(&mut self) {
        let generation = self.generation + 1;
        let include_preprints = self.include_preprints;
        *self = Self::new();
        self.generation = generation;
        self.include_preprints = include_preprints;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(titles: &[&str]) -> Vec<Reference> {
        titles
            .iter()
            .map(|title| {
                Reference::candidate(*title, "Journal Scout")
                    .with_authors(["Ada Lovelace"])
                    .with_year("1843")
            })
            .collect()
    }

    #[test]
    fn test_happy_path() {
        let mut pipeline = PipelineController::new();
        let ticket = pipeline.begin_search("analytical engines", "").unwrap();
        assert_eq!(pipeline.phase(), Phase::LiteratureSearch);

        assert!(pipeline.complete_search(&ticket, refs(&["Notes on the Engine", "Sketch"])));
        assert_eq!(pipeline.phase(), Phase::Curation);

        assert!(pipeline.advance().is_err());
        assert!(pipeline.toggle_selection(0).unwrap());
        assert_eq!(pipeline.advance().unwrap(), Phase::TopicSynthesis);
        assert!(pipeline.literature().is_empty());
        assert_eq!(pipeline.bibliography().len(), 1);

        assert_eq!(pipeline.advance().unwrap(), Phase::Methodology);
        assert_eq!(pipeline.advance().unwrap(), Phase::Drafting);
        assert_eq!(
            pipeline.bibliography()[0].citation_key.as_deref(),
            Some("lovelace1843notes")
        );
        assert!(pipeline.advance().is_err());
    }

    #[test]
    fn test_stale_ticket_is_ignored() {
        let mut pipeline = PipelineController::new();
        let first = pipeline.begin_search("topic one", "").unwrap();
        let second = pipeline.begin_search("topic two", "").unwrap();

        assert!(!pipeline.complete_search(&first, refs(&["Old"])));
        assert_eq!(pipeline.phase(), Phase::LiteratureSearch);
        assert!(pipeline.complete_search(&second, refs(&["New"])));
        assert_eq!(pipeline.literature()[0].title, "New");
    }

    #[test]
    fn test_toggling_preprints_reruns_search() {
        let mut pipeline = PipelineController::new();
        let ticket = pipeline.begin_search("topic", "ctx").unwrap();
        pipeline.complete_search(&ticket, refs(&["A"]));

        assert!(pipeline.set_include_preprints(false).is_none());
        let rerun = pipeline.set_include_preprints(true).unwrap();
        assert!(rerun.include_preprints);
        assert_eq!(rerun.topic, "topic");
        assert_eq!(rerun.context, "ctx");
        assert_eq!(pipeline.phase(), Phase::LiteratureSearch);
        assert!(pipeline.literature().is_empty());
        assert!(!pipeline.complete_search(&ticket, refs(&["A"])));
    }

    #[test]
    fn test_preprint_toggle_before_search_only_records_flag() {
        let mut pipeline = PipelineController::new();
        assert!(pipeline.set_include_preprints(true).is_none());
        assert!(pipeline.begin_search("topic", "").unwrap().include_preprints);
    }

    #[test]
    fn test_restart_invalidates_tickets() {
        let mut pipeline = PipelineController::new();
        let ticket = pipeline.begin_search("topic", "").unwrap();
        pipeline.restart();

        assert_eq!(pipeline.phase(), Phase::DomainInput);
        assert!(pipeline.topic().is_none());
        assert!(!pipeline.complete_search(&ticket, refs(&["A"])));
    }

    #[test]
    fn test_selection_bounds() {
        let mut pipeline = PipelineController::new();
        assert!(pipeline.toggle_selection(0).is_err());

        let ticket = pipeline.begin_search("topic", "").unwrap();
        pipeline.complete_search(&ticket, refs(&["A", "B"]));
        assert!(pipeline.toggle_selection(5).is_err());
        assert!(pipeline.toggle_selection(1).unwrap());
        assert!(!pipeline.toggle_selection(1).unwrap());
        assert!(pipeline.selected_references().is_empty());
    }

    #[test]
    fn test_empty_topic_rejected() {
        let mut pipeline = PipelineController::new();
        assert!(pipeline.begin_search("   ", "").is_err());
    }
}
