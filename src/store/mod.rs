// Listing store abstraction. Jobs are insert-only: nothing here updates or
// deletes a persisted listing.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::models::job::{CollectedJob, Job, ListingFilter, SortKey};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("listing store unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(e.to_string()),
            other => StoreError::Database(other),
        }
    }
}

/// A record the store refused during a bulk insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    /// Position of the record in the submitted batch.
    pub index: usize,
    pub reason: String,
}

/// Result of an unordered bulk insert.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    pub inserted: u64,
    pub errors: Vec<RecordError>,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert every record independently. Records that fail validation or a
    /// table constraint are reported in `InsertOutcome::errors` and do not
    /// prevent the rest of the batch from committing. `Err` means the store
    /// could not be reached at all.
    async fn insert_many(&self, jobs: &[CollectedJob]) -> Result<InsertOutcome, StoreError>;

    async fn count(&self, filter: &ListingFilter) -> Result<i64, StoreError>;

    async fn find(
        &self,
        filter: &ListingFilter,
        sort: SortKey,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Job>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}
