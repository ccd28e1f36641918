use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::job::{Job, ListingFilter, SortKey};
use crate::routes::AppState;
use crate::sample_data;

/// Page size of the unfiltered listing.
const LIST_PAGE_SIZE: i64 = 20;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// Query parameters shared by the listing endpoints. Numbers arrive as text
/// so that garbage falls back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListingParams {
    pub q: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListingParams {
    fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }

    fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .map(|l| l.min(MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT)
    }

    fn filter(&self, with_search: bool) -> ListingFilter {
        let non_blank = |v: &Option<String>| v.as_ref().filter(|s| !s.trim().is_empty()).cloned();
        ListingFilter {
            search: if with_search { non_blank(&self.q) } else { None },
            location: non_blank(&self.location),
            experience: non_blank(&self.experience),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPage {
    pub jobs: Vec<Job>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_jobs: i64,
}

fn total_pages(total: i64, limit: i64) -> i64 {
    (total + limit - 1) / limit
}

/// One page of matching listings. When nothing in the store matches, the
/// page is cut from the sample listings instead.
async fn paginate(
    state: &AppState,
    filter: ListingFilter,
    sort: SortKey,
    page: i64,
    limit: i64,
) -> Result<JobPage, AppError> {
    let offset = (page - 1).saturating_mul(limit);
    let total = state.store.count(&filter).await?;

    if total == 0 {
        let samples = sample_data::matching(&filter, sort);
        let total = samples.len() as i64;
        let jobs = samples
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        return Ok(JobPage {
            jobs,
            current_page: page,
            total_pages: total_pages(total, limit),
            total_jobs: total,
        });
    }

    let jobs = state.store.find(&filter, sort, offset, limit).await?;
    Ok(JobPage {
        jobs,
        current_page: page,
        total_pages: total_pages(total, limit),
        total_jobs: total,
    })
}

/// GET /api/jobs
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<JobPage>, AppError> {
    let page = paginate(
        &state,
        ListingFilter::default(),
        SortKey::CreatedAt,
        params.page(),
        LIST_PAGE_SIZE,
    )
    .await?;
    Ok(Json(page))
}

/// GET /api/jobs/search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<JobPage>, AppError> {
    let page = paginate(
        &state,
        params.filter(true),
        SortKey::PostedAt,
        params.page(),
        params.limit(),
    )
    .await?;
    Ok(Json(page))
}

/// GET /api/jobs/filter
pub async fn filter(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> Result<Json<JobPage>, AppError> {
    let page = paginate(
        &state,
        params.filter(false),
        SortKey::PostedAt,
        params.page(),
        params.limit(),
    )
    .await?;
    Ok(Json(page))
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    pub keyword: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub message: String,
    pub count: usize,
}

/// POST /api/jobs/refresh
///
/// Crawl every source for one keyword and save the results before
/// responding. `count` is the number of jobs found across sources; jobs the
/// store rejected are still counted.
pub async fn refresh(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RefreshResponse>, AppError> {
    let request: RefreshRequest = if body.is_empty() {
        RefreshRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))?
    };

    let keyword = request
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| AppError::BadRequest("Keyword is required".to_string()))?;

    let summary = state.pipeline.crawl_and_save(keyword).await;
    Ok(Json(RefreshResponse {
        message: format!("Successfully crawled and saved {} jobs", summary.found),
        count: summary.found,
    }))
}
