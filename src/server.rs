//! HTTP surface of the feed.
//!
//! `/api/obits` serves the JSON feed and `/calendar.ics` the calendar. Both
//! run the pipeline on every request; nothing is cached between requests.

use crate::adapters::http::HttpFetcher;
use crate::core::calendar::{self, CalendarOptions};
use crate::core::etl::EtlEngine;
use crate::core::{ConfigProvider, PageFetcher, Pipeline};
use crate::domain::model::FeedEntry;
use crate::utils::error::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::net::TcpListener;

const HOME_PAGE: &str = "<h1>Obituary API is Running</h1>\
<p>Try <a href='/api/obits'>/api/obits</a> or <a href='/calendar.ics'>/calendar.ics</a></p>";

/// A previously published JSON feed to rebuild the calendar from.
#[derive(Debug, Clone)]
pub struct RemoteFeed {
    url: String,
    fetcher: HttpFetcher,
}

impl RemoteFeed {
    pub fn new(url: impl Into<String>, fetcher: HttpFetcher) -> Self {
        Self {
            url: url.into(),
            fetcher,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Option<Self>> {
        match config.feed_url() {
            Some(url) => Ok(Some(Self::new(url, HttpFetcher::from_config(config)?))),
            None => Ok(None),
        }
    }

    pub async fn calendar(&self, options: &CalendarOptions) -> Result<String> {
        let body = self.fetcher.fetch_text(&self.url).await?;
        let entries = FeedEntry::parse_feed(&body)?;
        tracing::debug!("Read {} entries from {}", entries.len(), self.url);
        Ok(calendar::render_feed_entries(&entries, options))
    }
}

pub struct AppState<P: Pipeline> {
    engine: EtlEngine<P>,
    remote_feed: Option<RemoteFeed>,
    /// Used for remote feeds; the stamp is refreshed per request.
    calendar: CalendarOptions,
}

impl<P: Pipeline> AppState<P> {
    pub fn new(
        engine: EtlEngine<P>,
        calendar: CalendarOptions,
        remote_feed: Option<RemoteFeed>,
    ) -> Self {
        Self {
            engine,
            remote_feed,
            calendar,
        }
    }
}

pub fn router<P: Pipeline + 'static>(state: Arc<AppState<P>>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/favicon.ico", get(favicon))
        .route("/health", get(health))
        .route("/api/obits", get(obits::<P>))
        .route("/calendar.ics", get(calendar_ics::<P>))
        .with_state(state)
}

pub async fn start<P: Pipeline + 'static>(addr: &str, state: Arc<AppState<P>>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("🌐 Serving feeds on http://{}", listener.local_addr()?);
    serve(listener, state).await
}

pub async fn serve<P: Pipeline + 'static>(
    listener: TcpListener,
    state: Arc<AppState<P>>,
) -> Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────

async fn home() -> Html<&'static str> {
    Html(HOME_PAGE)
}

async fn favicon() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn obits<P: Pipeline + 'static>(State(state): State<Arc<AppState<P>>>) -> Response {
    match state.engine.collect().await {
        Ok(result) => (
            [(header::CONTENT_TYPE, "application/json")],
            result.json_output,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("❌ Feed request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn calendar_ics<P: Pipeline + 'static>(State(state): State<Arc<AppState<P>>>) -> Response {
    let result = match &state.remote_feed {
        Some(remote) => {
            let options = state.calendar.clone().with_stamp(Utc::now());
            remote.calendar(&options).await
        }
        None => state.engine.collect().await.map(|result| result.ics_output),
    };

    match result {
        Ok(ics) => (
            [(header::CONTENT_TYPE, "text/calendar; charset=utf-8")],
            ics,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("❌ Calendar request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                format!("Error generating calendar: {}", e),
            )
                .into_response()
        }
    }
}
