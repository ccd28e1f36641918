use std::sync::Arc;

use futures::future::join_all;

use crate::collectors::{FetchError, JobCollector};
use crate::models::job::CollectedJob;
use crate::store::{InsertOutcome, JobStore, StoreError};

/// What one collector produced for a keyword.
#[derive(Debug)]
pub struct SourceResult {
    pub source: String,
    pub result: Result<Vec<CollectedJob>, FetchError>,
}

/// Union of every collector's jobs for one keyword.
#[derive(Debug, Default)]
pub struct Aggregated {
    /// Registration order, then document order within each source.
    pub jobs: Vec<CollectedJob>,
    pub failed_sources: Vec<String>,
}

/// Outcome of one keyword's crawl-and-save run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub keyword: String,
    /// Jobs aggregated across sources, whether or not they were persisted.
    pub found: usize,
    pub inserted: u64,
    pub rejected: usize,
    pub failed_sources: Vec<String>,
    pub store_error: Option<String>,
}

/// Collectors plus the store they feed. Shared by the refresh scheduler and
/// the on-demand refresh endpoint.
pub struct Pipeline {
    collectors: Vec<Arc<dyn JobCollector>>,
    store: Arc<dyn JobStore>,
}

impl Pipeline {
    pub fn new(collectors: Vec<Arc<dyn JobCollector>>, store: Arc<dyn JobStore>) -> Self {
        Self { collectors, store }
    }

    /// Run every collector for `keyword`. Fetches proceed concurrently;
    /// results come back in registration order.
    pub async fn collect_all(&self, keyword: &str) -> Vec<SourceResult> {
        join_all(self.collectors.iter().map(|collector| async move {
            SourceResult {
                source: collector.name().to_string(),
                result: collector.collect(keyword).await,
            }
        }))
        .await
    }

    /// Concatenate every source's jobs. A failed source contributes nothing
    /// and is logged.
    pub async fn aggregate(&self, keyword: &str) -> Aggregated {
        let mut aggregated = Aggregated::default();
        for SourceResult { source, result } in self.collect_all(keyword).await {
            match result {
                Ok(jobs) => {
                    tracing::debug!("{source}: {} jobs for '{keyword}'", jobs.len());
                    aggregated.jobs.extend(jobs);
                }
                Err(e) => {
                    tracing::warn!("Error crawling {source} for '{keyword}': {e}");
                    aggregated.failed_sources.push(source);
                }
            }
        }
        aggregated
    }

    /// Bulk insert a batch. An empty batch never reaches the store.
    pub async fn save_jobs(&self, jobs: &[CollectedJob]) -> Result<InsertOutcome, StoreError> {
        if jobs.is_empty() {
            return Ok(InsertOutcome::default());
        }
        let outcome = self.store.insert_many(jobs).await?;
        for rejected in &outcome.errors {
            tracing::debug!("Rejected job {}: {}", rejected.index, rejected.reason);
        }
        tracing::info!(
            "Saved {} of {} jobs ({} rejected)",
            outcome.inserted,
            jobs.len(),
            outcome.errors.len()
        );
        Ok(outcome)
    }

    /// Aggregate then persist one keyword. Never fails: source and store
    /// errors are logged and recorded in the summary.
    pub async fn crawl_and_save(&self, keyword: &str) -> RunSummary {
        let aggregated = self.aggregate(keyword).await;
        let mut summary = RunSummary {
            keyword: keyword.to_string(),
            found: aggregated.jobs.len(),
            failed_sources: aggregated.failed_sources,
            ..Default::default()
        };

        match self.save_jobs(&aggregated.jobs).await {
            Ok(outcome) => {
                summary.inserted = outcome.inserted;
                summary.rejected = outcome.errors.len();
            }
            Err(e) => {
                tracing::error!("Error saving jobs for '{keyword}': {e}");
                summary.store_error = Some(e.to_string());
            }
        }

        tracing::info!(
            "Crawl for '{keyword}' completed: {} found, {} saved, {} rejected, {} sources failed",
            summary.found,
            summary.inserted,
            summary.rejected,
            summary.failed_sources.len()
        );
        summary
    }
}
