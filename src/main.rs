use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::EnvFilter;

use heritage_map::render::IconSet;
use heritage_map::server::{start_server, AppState};
use heritage_map::session::{spawn_load, MapSession};
use heritage_map::{Settings, SiteRepository};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new("heritage_map=info"))?,
        )
        .init();

    info!("HeritageMap v{} starting...", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load().with_context(|| "Failed to load settings")?;
    info!(
        "Using settings from {} (data source: {})",
        Settings::config_path().display(),
        settings.data_source
    );

    let (event_sender, _event_receiver) = broadcast::channel(100);
    let repository = SiteRepository::new();
    let session = MapSession::new(
        repository.clone(),
        IconSet::embedded(),
        settings.default_year,
        settings.notice_ttl(),
        event_sender.clone(),
    )
    .into_shared();

    // The map is served right away and renders an empty layer until this resolves
    spawn_load(session.clone(), settings.data_source());

    let app_state = AppState {
        session,
        repository,
        settings: Arc::new(settings),
        event_sender,
    };

    start_server(app_state).await?;

    Ok(())
}
