use std::sync::Arc;
use tokio::sync::broadcast;

use crate::events::MapEvent;
use crate::repository::SiteRepository;
use crate::session::SharedSession;
use crate::settings::Settings;

// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub session: SharedSession,
    pub repository: SiteRepository,
    pub settings: Arc<Settings>,
    pub event_sender: broadcast::Sender<MapEvent>,
}
