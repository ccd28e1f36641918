//! Daily job refresh.
//!
//! The scheduler is owned by `main`: it is started once with its keyword list
//! and run time, and stops when its cancellation token fires. Each tick crawls
//! the keywords one after another; a keyword's crawl always finishes before
//! the next keyword starts.

use std::sync::Arc;

use chrono::{Local, NaiveTime, Timelike};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tokio_util::sync::CancellationToken;

use crate::collectors::runner::{Pipeline, RunSummary};

pub struct RefreshScheduler {
    pipeline: Arc<Pipeline>,
    keywords: Vec<String>,
    run_at: NaiveTime,
    run_on_start: bool,
    /// Held for the whole of a tick so ticks never overlap.
    ticking: Mutex<()>,
}

impl RefreshScheduler {
    pub fn new(pipeline: Arc<Pipeline>, keywords: Vec<String>, run_at: NaiveTime) -> Self {
        Self {
            pipeline,
            keywords,
            run_at,
            run_on_start: false,
            ticking: Mutex::new(()),
        }
    }

    /// Also run one refresh as soon as the scheduler starts.
    pub fn run_on_start(mut self, enabled: bool) -> Self {
        self.run_on_start = enabled;
        self
    }

    /// Register the daily job and start the cron scheduler. The returned
    /// handle completes once `cancel` has fired, the scheduler is shut down
    /// and no tick is running.
    pub async fn start(self, cancel: CancellationToken) -> Result<JoinHandle<()>, JobSchedulerError> {
        let refresh = Arc::new(self);
        let mut scheduler = JobScheduler::new().await?;

        let job_refresh = refresh.clone();
        let job_cancel = cancel.clone();
        let schedule = cron_expression(refresh.run_at);
        let job = Job::new_async_tz(schedule.as_str(), Local, move |_uuid, _lock| {
            let refresh = job_refresh.clone();
            let cancel = job_cancel.clone();
            Box::pin(async move {
                refresh.run_tick(&cancel).await;
            })
        })?;
        scheduler.add(job).await?;
        scheduler.start().await?;

        tracing::info!(
            "Refresh scheduler started: {} keywords daily at {} local time ({schedule})",
            refresh.keywords.len(),
            refresh.run_at
        );

        Ok(tokio::spawn(async move {
            if refresh.run_on_start {
                refresh.run_tick(&cancel).await;
            }
            cancel.cancelled().await;

            if let Err(e) = scheduler.shutdown().await {
                tracing::warn!("Failed to shut down refresh scheduler: {e}");
            }
            // Wait out a tick that was mid-keyword when the token fired.
            let _idle = refresh.ticking.lock().await;
            tracing::info!("Refresh scheduler stopped");
        }))
    }

    /// Crawl every keyword in order. A keyword whose crawl panics is logged
    /// and skipped. Cancellation aborts the crawl in flight and ends the tick.
    pub async fn run_tick(&self, cancel: &CancellationToken) -> Vec<RunSummary> {
        let _running = self.ticking.lock().await;
        let mut summaries = Vec::with_capacity(self.keywords.len());
        if cancel.is_cancelled() {
            return summaries;
        }
        tracing::info!("Running daily job refresh...");

        for keyword in &self.keywords {
            let pipeline = self.pipeline.clone();
            let owned = keyword.clone();
            let mut crawl = tokio::spawn(async move { pipeline.crawl_and_save(&owned).await });

            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    crawl.abort();
                    let _ = crawl.await;
                    tracing::info!("Daily job refresh cancelled during '{keyword}'");
                    break;
                }
                joined = &mut crawl => joined,
            };
            match joined {
                Ok(summary) => summaries.push(summary),
                Err(e) => tracing::error!("Error in daily job refresh for '{keyword}': {e}"),
            }
        }

        let found: usize = summaries.iter().map(|s| s.found).sum();
        let inserted: u64 = summaries.iter().map(|s| s.inserted).sum();
        let unsaved = summaries.iter().filter(|s| s.store_error.is_some()).count();
        tracing::info!(
            "Daily job refresh completed: {}/{} keywords, {found} found, {inserted} saved",
            summaries.len(),
            self.keywords.len()
        );
        if unsaved > 0 {
            tracing::warn!("{unsaved} keywords could not be saved during the daily refresh");
        }
        summaries
    }
}

/// Six-field cron expression (with seconds) firing daily at `at`.
pub fn cron_expression(at: NaiveTime) -> String {
    format!("{} {} {} * * *", at.second(), at.minute(), at.hour())
}
