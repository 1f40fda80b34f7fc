use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};
use tracing::{info, warn};

pub mod handlers;
pub mod state;

pub use self::state::AppState;
use handlers::{
    clear_search, click_details, close_details, details_image_failed, get_config, get_markers,
    get_site, get_state, index_html, map_events_stream, set_epic, set_search, set_theme,
    set_year, show_details, static_asset,
};

// Create the main application router
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_html))
        .route("/api/config", get(get_config))
        .route("/api/state", get(get_state))
        .route("/api/markers", get(get_markers))
        .route("/api/sites/:index", get(get_site))
        .route("/api/theme", post(set_theme))
        .route("/api/epic", post(set_epic))
        .route("/api/year", post(set_year))
        .route("/api/search", post(set_search))
        .route("/api/search/clear", post(clear_search))
        .route("/api/details/show/:index", post(show_details))
        .route("/api/details/close", post(close_details))
        .route("/api/details/click", post(click_details))
        .route("/api/details/image-failed", post(details_image_failed))
        .route("/api/events", get(map_events_stream))
        .fallback(static_asset)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState) -> Result<()> {
    let port = state.settings.port;
    let open_browser = state.settings.auto_open_browser;
    let app = create_app(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;

    info!("HTTP server started at http://{}", addr);

    if open_browser {
        let url = format!("http://{}", addr);
        // The launcher is reaped in the background; its exit status is not needed
        if let Err(e) = crate::browser::open(&url) {
            warn!("Could not open browser at {}: {}", url, e);
        }
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
