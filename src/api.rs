//! HTTP surface for the invocable functions.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/` | [`health_check`] |
//! | POST | `/fetch-news` | [`fetch_news`] |
//! | POST | `/admin-login` | [`admin_login`] |
//! | GET | `/admin/session` | [`admin_session`] |
//! | GET | `/news` | [`list_news`] |
//!
//! CORS is open to any origin, and preflight requests are answered by the
//! CORS layer before they reach a handler.

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

use crate::BoxError;
use crate::auth::{ClientMeta, SessionResponse, login, verify_session};
use crate::config::Settings;
use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse};
use crate::pipeline::run_scrape;
use crate::scrapers::fetch::PageFetcher;
use crate::store::{AdminStore, NewsStore};

const DEFAULT_NEWS_LIMIT: usize = 20;
const MAX_NEWS_LIMIT: usize = 100;

/// Shared, immutable state behind every handler.
#[derive(Debug)]
pub struct AppState<F, S> {
    pub settings: Settings,
    pub fetcher: F,
    pub store: S,
}

type Shared<F, S> = State<Arc<AppState<F, S>>>;

pub fn router<F, S>(state: Arc<AppState<F, S>>) -> Router
where
    F: PageFetcher + 'static,
    S: NewsStore + AdminStore + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health_check))
        .route("/fetch-news", post(fetch_news::<F, S>))
        .route("/admin-login", post(admin_login::<F, S>))
        .route("/admin/session", get(admin_session::<F, S>))
        .route("/news", get(list_news::<F, S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process stops.
pub async fn serve<F, S>(state: AppState<F, S>, addr: &str) -> Result<(), BoxError>
where
    F: PageFetcher + 'static,
    S: NewsStore + AdminStore + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(Arc::new(state))).await?;
    Ok(())
}

pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "message": "ok", "version": env!("CARGO_PKG_VERSION") })),
    )
}

/// Run one scrape pass and report what was found and stored.
#[instrument(level = "info", skip_all)]
pub async fn fetch_news<F, S>(State(state): Shared<F, S>) -> Response
where
    F: PageFetcher + 'static,
    S: NewsStore + AdminStore + 'static,
{
    match run_scrape(&state.fetcher, &state.store, &state.settings).await {
        Ok(report) if report.articles.is_empty() => (
            StatusCode::OK,
            Json(json!({ "success": false, "message": "No articles found during scraping" })),
        )
            .into_response(),
        Ok(report) => {
            let message = format!(
                "Scraped {} articles, {} unique, {} inserted",
                report.stats.total_scraped, report.stats.unique_articles, report.stats.inserted
            );
            info!(?report.stats, "Scrape finished");
            (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "message": message,
                    "articles": report.articles,
                    "stats": report.stats,
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Scrape failed");
            ApiError::internal(&e.to_string()).into_response()
        }
    }
}

pub async fn admin_login<F, S>(
    State(state): Shared<F, S>,
    headers: HeaderMap,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError>
where
    F: PageFetcher + 'static,
    S: NewsStore + AdminStore + 'static,
{
    let Json(request) = payload?;
    let meta = ClientMeta::from_headers(&headers);
    let ttl = state.settings.session_ttl();
    match login(&state.store, request, meta, ttl, Utc::now()).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            info!(status = %e.code, error = e.message(), "Admin login rejected");
            Err(e)
        }
    }
}

pub async fn admin_session<F, S>(
    State(state): Shared<F, S>,
    headers: HeaderMap,
) -> Result<Json<SessionResponse>, ApiError>
where
    F: PageFetcher + 'static,
    S: NewsStore + AdminStore + 'static,
{
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or((StatusCode::UNAUTHORIZED, "Missing Bearer token"))?;
    let response = verify_session(&state.store, token, Utc::now()).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub limit: Option<usize>,
}

/// Latest persisted rows for the ticker, newest first.
pub async fn list_news<F, S>(
    State(state): Shared<F, S>,
    query: Result<Query<NewsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError>
where
    F: PageFetcher + 'static,
    S: NewsStore + AdminStore + 'static,
{
    let Query(query) = query?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_NEWS_LIMIT)
        .clamp(1, MAX_NEWS_LIMIT);
    match state.store.latest_news(limit).await {
        Ok(articles) => Ok(Json(json!({ "success": true, "articles": articles }))),
        Err(e) => {
            error!(error = %e, "News query failed");
            Err(ApiError::internal("Failed to load news"))
        }
    }
}
