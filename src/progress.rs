//! Push-based progress reporting
//!
//! The search pipeline never returns progress through its results. Instead it
//! pushes [`ProgressEvent`]s into a [`ProgressSink`] supplied by the caller, so
//! the core can be driven (and tested) without any UI attached.
//!
//! Sinks exist for closures, for tokio channels ([`ChannelProgress`]), and
//! for collecting events in memory ([`ProgressCollector`]).

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// A single progress notification from the search pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// An agent has been launched
    AgentStarted { agent: String },
    /// An agent hit the rate limiter and will try again after `delay_ms`
    AgentRetrying {
        agent: String,
        attempt: u32,
        delay_ms: u64,
    },
    /// An agent returned `candidates` parsed references
    AgentFinished { agent: String, candidates: usize },
    /// An agent failed and contributes nothing to the session
    AgentFailed { agent: String, error: String },
    /// All agent outputs were flattened and deduplicated
    CandidatesMerged { raw: usize, unique: usize },
    /// One reference finished validation (successfully or not)
    ReferenceValidated {
        completed: usize,
        total: usize,
        title: String,
        verified: bool,
    },
    /// The session finished with `retained` references after filtering
    SearchCompleted { retained: usize },
}

/// Receiver of progress events.
///
/// Implementations must be cheap and must not block: events are emitted
/// from inside the concurrent fetch phase.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Sink that forwards events into a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelProgress(pub UnboundedSender<ProgressEvent>);

impl ProgressSink for ChannelProgress {
    fn emit(&self, event: ProgressEvent) {
        // A dropped receiver only means nobody is listening any more
        let _ = self.0.send(event);
    }
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Shared handle to a sink, as held by the orchestrator and its tasks.
pub type SharedProgress = Arc<dyn ProgressSink>;

/// Convenience constructor for a sink that ignores everything.
pub fn noop() -> SharedProgress {
    Arc::new(NoopProgress)
}

/// Sink that records every event, in arrival order.
#[derive(Debug, Default)]
pub struct ProgressCollector {
    events: Mutex<Vec<ProgressEvent>>,
}

impl ProgressCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl ProgressSink for ProgressCollector {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().push(event);
    }
}
