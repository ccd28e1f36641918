mod collectors;
mod config;
mod db;
mod error;
mod models;
mod routes;
mod sample_data;
mod scheduler;
mod store;

use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::collectors::runner::Pipeline;
use crate::config::{Command, Config, ServeArgs};
use crate::routes::AppState;
use crate::scheduler::RefreshScheduler;
use crate::store::JobStore;
use crate::store::postgres::PgJobStore;

async fn index() -> impl IntoResponse {
    Json(json!({ "message": "Job Board API is running" }))
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "not ready"),
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("jobboard=info,tower_http=info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.log_json);

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    if config.run_migrations {
        tracing::info!("Running database migrations...");
        db::run_migrations(&pool).await?;
        tracing::info!("Migrations complete");
    }

    let store: Arc<dyn JobStore> = Arc::new(PgJobStore::new(pool));
    let collectors = collectors::default_collectors(&config.collector_settings())
        .context("Failed to build HTTP client")?;
    let pipeline = Arc::new(Pipeline::new(collectors, store.clone()));

    match config.resolved_command() {
        Command::Serve(args) => serve(args, store, pipeline).await,
        Command::Refresh { keyword } => {
            let summary = pipeline.crawl_and_save(&keyword).await;
            tracing::info!("Successfully crawled and saved {} jobs", summary.found);
            Ok(())
        }
    }
}

async fn serve(args: ServeArgs, store: Arc<dyn JobStore>, pipeline: Arc<Pipeline>) -> anyhow::Result<()> {
    let cancel = CancellationToken::new();

    let scheduler = if args.scheduler_enabled {
        let handle = RefreshScheduler::new(
            pipeline.clone(),
            args.refresh_keywords.clone(),
            args.refresh_at,
        )
        .run_on_start(args.refresh_on_startup)
        .start(cancel.clone())
        .await
        .context("Failed to start refresh scheduler")?;
        Some(handle)
    } else {
        tracing::info!("Daily job refresh disabled");
        None
    };

    let origins = args
        .cors_origins
        .iter()
        .map(|origin| HeaderValue::from_str(origin.trim()))
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid CORS origin")?;
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let state = AppState { store, pipeline };
    let app = Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz).with_state(state.clone()))
        .merge(routes::api::router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(&args.listen_addr).await?;
    tracing::info!("Listening on {}", args.listen_addr);

    let shutdown = cancel.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, exiting gracefully");
                }
                _ = shutdown.cancelled() => {}
            }
            shutdown.cancel();
        })
        .await?;

    cancel.cancel();
    if let Some(handle) = scheduler {
        let _ = handle.await;
    }

    Ok(())
}
