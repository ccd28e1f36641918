use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::job::{CollectedJob, Job, ListingFilter, SortKey};
use crate::store::{InsertOutcome, JobStore, RecordError, StoreError};

/// Postgres caps a statement at 65535 bind parameters; each row binds 8.
const ROWS_PER_STATEMENT: usize = 1000;

const INSERT_PREFIX: &str = "INSERT INTO jobs (title, company, location, experience, description, application_link, source, posted_at) ";

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_rows(&self, rows: &[(usize, &CollectedJob)]) -> Result<u64, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(INSERT_PREFIX);
        builder.push_values(rows, |mut row, (_, job)| {
            row.push_bind(job.title.as_str())
                .push_bind(job.company.as_str())
                .push_bind(job.location.as_str())
                .push_bind(job.experience.as_str())
                .push_bind(job.description.as_str())
                .push_bind(job.application_link.as_str())
                .push_bind(job.source.as_str())
                .push_bind(job.posted_at);
        });
        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn insert_many(&self, jobs: &[CollectedJob]) -> Result<InsertOutcome, StoreError> {
        let mut outcome = InsertOutcome::default();

        let mut valid = Vec::with_capacity(jobs.len());
        for (index, job) in jobs.iter().enumerate() {
            match job.validate() {
                Ok(()) => valid.push((index, job)),
                Err(e) => outcome.errors.push(RecordError {
                    index,
                    reason: e.to_string(),
                }),
            }
        }

        for chunk in valid.chunks(ROWS_PER_STATEMENT) {
            match self.insert_rows(chunk).await.map_err(StoreError::from) {
                Ok(n) => outcome.inserted += n,
                Err(StoreError::Database(e)) => {
                    // One bad row rejects the whole statement; isolate it.
                    tracing::debug!("Batch insert rejected ({e}), retrying row by row");
                    for row in chunk {
                        match self
                            .insert_rows(std::slice::from_ref(row))
                            .await
                            .map_err(StoreError::from)
                        {
                            Ok(n) => outcome.inserted += n,
                            Err(StoreError::Database(e)) => outcome.errors.push(RecordError {
                                index: row.0,
                                reason: e.to_string(),
                            }),
                            Err(e) => return Err(e),
                        }
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Ok(outcome)
    }

    async fn count(&self, filter: &ListingFilter) -> Result<i64, StoreError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM jobs");
        push_filter(&mut builder, filter);
        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn find(
        &self,
        filter: &ListingFilter,
        sort: SortKey,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Job>, StoreError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM jobs");
        push_filter(&mut builder, filter);
        builder.push(match sort {
            SortKey::CreatedAt => " ORDER BY created_at DESC, id DESC",
            SortKey::PostedAt => " ORDER BY posted_at DESC, id DESC",
        });
        builder
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);
        let jobs = builder
            .build_query_as::<Job>()
            .fetch_all(&self.pool)
            .await?;
        Ok(jobs)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ListingFilter) {
    let mut keyword = " WHERE ";
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(keyword)
            .push("(title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR company ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
        keyword = " AND ";
    }
    if let Some(location) = &filter.location {
        builder
            .push(keyword)
            .push("location = ")
            .push_bind(location.clone());
        keyword = " AND ";
    }
    if let Some(experience) = &filter.experience {
        builder
            .push(keyword)
            .push("experience = ")
            .push_bind(experience.clone());
    }
}

/// Escape LIKE metacharacters so the search term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
