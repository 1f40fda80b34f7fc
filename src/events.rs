use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::details::DetailsPanel;
use crate::notify::Notice;
use crate::render::Marker;
use crate::view_state::ViewState;

// SSE event types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", content = "data", rename_all = "snake_case")]
pub enum MapEvent {
    /// The marker layer was redrawn.
    Markers(MarkersData),
    Details(DetailsPanel),
    Notice(Notice),
    NoticeDismissed { id: u64 },
    Loaded(LoadStatus),
    Heartbeat { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct MarkersData {
    pub view: ViewState,
    pub epic_menu_open: bool,
    pub markers: Vec<Marker>,
    pub total_sites: usize,
}

/// Progress of the one-time site load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    Pending,
    Loaded {
        count: usize,
        loaded_at: DateTime<Utc>,
    },
    Failed {
        message: String,
        failed_at: DateTime<Utc>,
    },
}
