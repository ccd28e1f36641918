use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use crate::models::job::{CollectedJob, Job, ListingFilter, SortKey};
use crate::store::{InsertOutcome, JobStore, RecordError, StoreError};

/// In-process listing store with the same validation as the `jobs` table.
#[derive(Default)]
pub struct MemoryJobStore {
    jobs: Mutex<Vec<Job>>,
    unavailable: AtomicBool,
    insert_calls: AtomicUsize,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails every call as if the database were unreachable.
    pub fn unavailable() -> Self {
        let store = Self::default();
        store.unavailable.store(true, Ordering::SeqCst);
        store
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn insert_many(&self, jobs: &[CollectedJob]) -> Result<InsertOutcome, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let mut outcome = InsertOutcome::default();
        let mut stored = self.jobs.lock().unwrap();
        for (index, job) in jobs.iter().enumerate() {
            if let Err(e) = job.validate() {
                outcome.errors.push(RecordError {
                    index,
                    reason: e.to_string(),
                });
                continue;
            }
            let now = Utc::now();
            let id = stored.len() as i32 + 1;
            stored.push(Job {
                id,
                title: job.title.clone(),
                company: job.company.clone(),
                location: job.location.clone(),
                experience: job.experience.clone(),
                description: job.description.clone(),
                application_link: job.application_link.clone(),
                source: job.source.clone(),
                posted_at: job.posted_at,
                created_at: now,
                updated_at: now,
            });
            outcome.inserted += 1;
        }
        Ok(outcome)
    }

    async fn count(&self, filter: &ListingFilter) -> Result<i64, StoreError> {
        self.check()?;
        let stored = self.jobs.lock().unwrap();
        Ok(stored.iter().filter(|job| filter.matches(job)).count() as i64)
    }

    async fn find(
        &self,
        filter: &ListingFilter,
        sort: SortKey,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Job>, StoreError> {
        self.check()?;
        let stored = self.jobs.lock().unwrap();
        let mut matched: Vec<Job> = stored
            .iter()
            .filter(|job| filter.matches(job))
            .cloned()
            .collect();
        match sort {
            SortKey::CreatedAt => matched.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id))),
            SortKey::PostedAt => matched.sort_by(|a, b| (b.posted_at, b.id).cmp(&(a.posted_at, a.id))),
        }
        Ok(matched
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }
}
