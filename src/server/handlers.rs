use axum::{
    extract::{Path as AxumPath, State},
    http::{header, StatusCode, Uri},
    response::{
        sse::{Event as SseEvent, KeepAlive},
        Html, IntoResponse, Json, Response, Sse,
    },
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;
use tracing::{debug, warn};

use crate::assets::{mime_type, Asset};
use crate::constants::{
    INITIAL_SETTLE_MS, MAP_CENTER, MAP_MAX_ZOOM, MAP_ZOOM, RESIZE_SETTLE_MS, SIDEBAR_SETTLE_MS,
    SSE_HEARTBEAT_SECS, TILE_ATTRIBUTION, TILE_URL,
};
use crate::details::{ClickTarget, DetailsPanel};
use crate::events::MapEvent;
use crate::render::Marker;
use crate::session::{self, MapSnapshot};
use crate::site::{Category, Site};
use crate::view_state::Theme;

use super::state::AppState;

/// Static layout and timing values for the page.
#[derive(Debug, Serialize)]
pub struct ClientConfig {
    pub center: [f64; 2],
    pub zoom: u8,
    pub max_zoom: u8,
    pub tile_url: &'static str,
    pub attribution: &'static str,
    pub themes: Vec<String>,
    pub min_year: f64,
    pub max_year: f64,
    pub default_year: f64,
    pub resize_settle_ms: u64,
    pub sidebar_settle_ms: u64,
    pub initial_settle_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: Theme,
}

#[derive(Debug, Deserialize)]
pub struct EpicRequest {
    pub epic: String,
}

#[derive(Debug, Deserialize)]
pub struct YearRequest {
    pub year: f64,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    pub target: ClickTarget,
}

pub async fn index_html() -> Result<Html<Vec<u8>>, StatusCode> {
    let page = Asset::get("index.html").ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Html(page.data.into_owned()))
}

/// Serves styles, script and icons from the embedded frontend.
pub async fn static_asset(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');
    match Asset::get(path) {
        Some(content) => Response::builder()
            .header(header::CONTENT_TYPE, mime_type(path))
            .header(header::CACHE_CONTROL, "public, max-age=3600")
            .body(content.data.into_owned().into())
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        None => {
            debug!("No embedded asset for {}", path);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

pub async fn get_config(State(state): State<AppState>) -> Json<ClientConfig> {
    let settings = &state.settings;
    let themes = std::iter::once("all".to_string())
        .chain(Category::KNOWN.iter().map(|c| c.as_str().to_string()))
        .collect();

    Json(ClientConfig {
        center: MAP_CENTER,
        zoom: MAP_ZOOM,
        max_zoom: MAP_MAX_ZOOM,
        tile_url: TILE_URL,
        attribution: TILE_ATTRIBUTION,
        themes,
        min_year: settings.min_year,
        max_year: settings.max_year,
        default_year: settings.default_year,
        resize_settle_ms: RESIZE_SETTLE_MS,
        sidebar_settle_ms: SIDEBAR_SETTLE_MS,
        initial_settle_ms: INITIAL_SETTLE_MS,
    })
}

pub async fn get_state(State(state): State<AppState>) -> Json<MapSnapshot> {
    Json(state.session.lock().await.snapshot())
}

pub async fn get_markers(State(state): State<AppState>) -> Json<Vec<Marker>> {
    Json(state.session.lock().await.markers().to_vec())
}

pub async fn get_site(
    State(state): State<AppState>,
    AxumPath(index): AxumPath<usize>,
) -> Result<Json<Site>, StatusCode> {
    state
        .repository
        .get(index)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn set_theme(
    State(state): State<AppState>,
    Json(request): Json<ThemeRequest>,
) -> Json<MapSnapshot> {
    let mut session = state.session.lock().await;
    session.set_theme(request.theme);
    Json(session.snapshot())
}

pub async fn set_epic(
    State(state): State<AppState>,
    Json(request): Json<EpicRequest>,
) -> Json<MapSnapshot> {
    let mut session = state.session.lock().await;
    session.set_epic(request.epic);
    Json(session.snapshot())
}

pub async fn set_year(
    State(state): State<AppState>,
    Json(request): Json<YearRequest>,
) -> Json<MapSnapshot> {
    let mut session = state.session.lock().await;
    session.set_year(request.year);
    Json(session.snapshot())
}

/// Debounced: the result arrives as a `markers` event once the window passes
/// without a newer search.
pub async fn set_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let window = state.settings.search_debounce();
    // Detached; a newer search or a clear makes it a no-op
    let _pending = session::schedule_search(&state.session, request.query, window).await;

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "status": "scheduled",
            "debounce_ms": window.as_millis() as u64,
        })),
    )
}

pub async fn clear_search(State(state): State<AppState>) -> Json<MapSnapshot> {
    Json(session::clear_search(&state.session).await)
}

pub async fn show_details(
    State(state): State<AppState>,
    AxumPath(index): AxumPath<usize>,
) -> Result<Json<DetailsPanel>, StatusCode> {
    let mut session = state.session.lock().await;
    session
        .show_details(index)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn close_details(State(state): State<AppState>) -> Json<DetailsPanel> {
    Json(state.session.lock().await.close_details().clone())
}

pub async fn click_details(
    State(state): State<AppState>,
    Json(request): Json<ClickRequest>,
) -> Json<DetailsPanel> {
    Json(state.session.lock().await.click_details(request.target).clone())
}

pub async fn details_image_failed(State(state): State<AppState>) -> Json<DetailsPanel> {
    Json(state.session.lock().await.details_image_failed().clone())
}

// SSE endpoint pushing redraws, panel changes and notices to the page
pub async fn map_events_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let (tx, rx) = mpsc::channel(100);
    let mut event_receiver = state.event_sender.subscribe();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                event = event_receiver.recv() => {
                    match event {
                        Ok(map_event) => {
                            if tx.send(Ok(to_sse(&map_event))).await.is_err() {
                                break; // Client disconnected
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            // The page resyncs from /api/state on the next markers event
                            warn!("SSE client lagged, skipped {} events", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = tokio::time::sleep(Duration::from_secs(SSE_HEARTBEAT_SECS)) => {
                    let heartbeat = MapEvent::Heartbeat {
                        message: "SSE connection alive".to_string(),
                    };
                    if tx.send(Ok(to_sse(&heartbeat))).await.is_err() {
                        break; // Client disconnected
                    }
                }
            }
        }
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keepalive-message"),
    )
}

fn to_sse(event: &MapEvent) -> SseEvent {
    SseEvent::default()
        .json_data(event)
        .unwrap_or_else(|_| SseEvent::default().data("Error serializing event"))
}
