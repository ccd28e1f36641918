pub mod jobs;

use axum::Router;
use axum::routing::{get, post};

use crate::routes::AppState;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/jobs", get(jobs::list))
        .route("/jobs/search", get(jobs::search))
        .route("/jobs/filter", get(jobs::filter))
        .route("/jobs/refresh", post(jobs::refresh))
        .with_state(state);

    Router::new().nest("/api", api)
}
