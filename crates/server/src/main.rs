use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use record_store::AirtableStore;
use server_api::{
    blog_route, ideas_route, list_blog, settle_submission, try_submit_idea, ApiContext,
};
use shared::{
    domain::RawFields,
    error::{ApiError, ErrorCode},
    protocol::{BlogListing, BlogQuery, SubmissionResult},
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use crate::{app_state::AppState, config::load_settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings()?;
    if !settings.airtable.is_configured() {
        warn!("airtable credentials missing; idea submissions will be refused");
    }
    let store = AirtableStore::new(settings.airtable.to_config())
        .context("failed to build record store client")?;

    let state = AppState {
        api: ApiContext::new(store),
    };
    let app = build_router(Arc::new(state), settings.max_form_bytes);

    let addr: SocketAddr = settings
        .bind_addr
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.bind_addr))?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_form_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(ideas_route(), post(http_submit_idea))
        .route(blog_route(), get(http_list_blog))
        .layer(RequestBodyLimitLayer::new(max_form_bytes))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_submit_idea(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<RawFields>,
) -> (StatusCode, Json<SubmissionResult>) {
    let outcome = try_submit_idea(&state.api, &fields).await;
    let status = match &outcome {
        Ok(()) => StatusCode::OK,
        Err(err) => status_for(err.code()),
    };
    (status, Json(settle_submission(outcome)))
}

async fn http_list_blog(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BlogQuery>,
) -> Result<Json<BlogListing>, (StatusCode, Json<ApiError>)> {
    list_blog(&state.api, &query)
        .await
        .map(Json)
        .map_err(|e| (status_for(e.code), Json(e)))
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Upstream => StatusCode::BAD_GATEWAY,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
