//! Concurrent batch validation.

use super::resolver::BibliographicResolver;
use crate::progress::{ProgressEvent, ProgressSink};
use crate::types::Reference;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Applies the resolver to a batch of candidates.
///
/// Output order always matches input order. `max_concurrency` caps the
/// number of in-flight resolutions; `None` resolves the whole batch at once.
#[derive(Clone)]
pub struct ReferenceValidator {
    resolver: Arc<BibliographicResolver>,
    max_concurrency: Option<usize>,
}

impl ReferenceValidator {
    pub fn new(resolver: Arc<BibliographicResolver>) -> Self {
        Self {
            resolver,
            max_concurrency: None,
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: Option<usize>) -> Self {
        self.max_concurrency = max_concurrency.filter(|limit| *limit > 0);
        self
    }

    pub fn max_concurrency(&self) -> Option<usize> {
        self.max_concurrency
    }

    /// Resolve every candidate, emitting one `ReferenceValidated` event per
    /// completed item.
    pub async fn validate_batch(
        &self,
        candidates: Vec<Reference>,
        progress: &dyn ProgressSink,
    ) -> Vec<Reference> {
        let total = candidates.len();
        if total == 0 {
            return Vec::new();
        }

        let limit = self.max_concurrency.unwrap_or(total);
        let completed = AtomicUsize::new(0);
        tracing::info!(total, limit, "Validating references");

        let validated: Vec<Reference> = stream::iter(candidates)
            .map(|candidate| {
                let resolver = Arc::clone(&self.resolver);
                let completed = &completed;
                async move {
                    let resolved = resolver.resolve(candidate).await;
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    progress.emit(ProgressEvent::ReferenceValidated {
                        completed: done,
                        total,
                        title: resolved.title.clone(),
                        verified: resolved.is_verified,
                    });
                    resolved
                }
            })
            .buffered(limit)
            .collect()
            .await;

        let verified = validated.iter().filter(|r| r.is_verified).count();
        tracing::info!(verified, unverified = total - verified, "Validation finished");
        validated
    }
}
