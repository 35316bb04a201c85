//! Context aggregation: run every registered source against one root.
//!
//! Sources run concurrently; the result always has one unit per source, in
//! registration order. A failing source becomes an error unit and never
//! aborts the pass.

use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use oli_core::{ContextSource, ContextUnit};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// An ordered set of context sources.
#[derive(Clone, Default)]
pub struct ContextAggregator {
    sources: Vec<Arc<dyn ContextSource>>,
}

impl ContextAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: Arc<dyn ContextSource>) {
        debug!(source = source.name(), "Registered context source");
        self.sources.push(source);
    }

    pub fn with_source(mut self, source: Arc<dyn ContextSource>) -> Self {
        self.register(source);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Gather from all sources. Infallible: failures are folded into units.
    pub async fn gather(&self, root: &Path, cancel: &CancellationToken) -> Vec<ContextUnit> {
        let pending = self.sources.iter().map(|source| async move {
            match source.gather(root, cancel).await {
                Ok(unit) => unit,
                Err(e) => {
                    warn!(source = source.name(), error = %e, "Context source failed");
                    ContextUnit::failed(source.name(), e.to_string())
                }
            }
        });
        join_all(pending).await
    }
}

impl std::fmt::Debug for ContextAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextAggregator")
            .field("sources", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walker::TreeWalker;
    use async_trait::async_trait;
    use oli_core::error::ContextError;
    use oli_core::WalkBudget;
    use std::time::Duration;

    struct Fixed {
        name: &'static str,
        delay_ms: u64,
        result: Result<&'static str, &'static str>,
    }

    #[async_trait]
    impl ContextSource for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn gather(
            &self,
            _root: &Path,
            _cancel: &CancellationToken,
        ) -> Result<ContextUnit, ContextError> {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
            match self.result {
                Ok(text) => Ok(ContextUnit::content(self.name, text)),
                Err(reason) => Err(ContextError::Source(reason.into())),
            }
        }
    }

    fn fixed(
        name: &'static str,
        delay_ms: u64,
        result: Result<&'static str, &'static str>,
    ) -> Arc<dyn ContextSource> {
        Arc::new(Fixed {
            name,
            delay_ms,
            result,
        })
    }

    #[tokio::test]
    async fn one_unit_per_source_in_registration_order() {
        let agg = ContextAggregator::new()
            .with_source(fixed("slow", 40, Ok("first")))
            .with_source(fixed("broken", 0, Err("exploded")))
            .with_source(fixed("fast", 0, Ok("third")));
        assert_eq!(agg.names(), vec!["slow", "broken", "fast"]);

        let units = agg.gather(Path::new("."), &CancellationToken::new()).await;
        assert_eq!(units.len(), 3);
        assert_eq!(units[0], ContextUnit::content("slow", "first"));
        assert_eq!(units[1].source_name, "broken");
        assert_eq!(units[1].error.as_deref(), Some("exploded"));
        assert!(units[1].content.is_empty());
        assert_eq!(units[2], ContextUnit::content("fast", "third"));
    }

    #[tokio::test]
    async fn empty_aggregator_yields_nothing() {
        let agg = ContextAggregator::new();
        assert!(agg.is_empty());
        let units = agg.gather(Path::new("."), &CancellationToken::new()).await;
        assert!(units.is_empty());
    }

    #[tokio::test]
    async fn cancelled_source_becomes_error_unit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "x").unwrap();

        let agg = ContextAggregator::new()
            .with_source(Arc::new(TreeWalker::new(WalkBudget::default())))
            .with_source(fixed("other", 0, Ok("still here")));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let units = agg.gather(dir.path(), &cancel).await;

        assert_eq!(units[0].source_name, "filesystem");
        assert!(units[0].is_error());
        assert_eq!(units[1].content, "still here");
    }
}
