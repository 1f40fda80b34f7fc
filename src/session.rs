//! The map session: one view state, one marker layer, one details panel.
//!
//! Every applied view-state change recomputes the visible sites and redraws
//! the marker layer, then publishes the result to connected pages.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::details::{ClickTarget, DetailsPanel};
use crate::events::{LoadStatus, MapEvent, MarkersData};
use crate::filter::visible_sites;
use crate::notify::{Notice, NoticeBoard};
use crate::render::{IconSet, Marker, MarkerLayer};
use crate::repository::{DataSource, LoadError, SiteRepository};
use crate::site::Site;
use crate::view_state::{Theme, ViewState, ViewStateController};

pub type SharedSession = Arc<Mutex<MapSession>>;

pub const LOAD_FAILED_MESSAGE: &str =
    "Failed to load heritage sites data. Please check the server log for details.";

/// Everything a freshly connected page needs to draw itself.
#[derive(Debug, Clone, Serialize)]
pub struct MapSnapshot {
    pub view: ViewState,
    pub epic_menu_open: bool,
    pub epics: Vec<String>,
    pub markers: Vec<Marker>,
    pub total_sites: usize,
    pub details: DetailsPanel,
    pub notice: Option<Notice>,
    pub load: LoadStatus,
}

pub struct MapSession {
    repository: SiteRepository,
    view: ViewStateController,
    layer: MarkerLayer,
    details: DetailsPanel,
    notices: NoticeBoard,
    load: LoadStatus,
    events: broadcast::Sender<MapEvent>,
    redraws: u64,
}

impl MapSession {
    pub fn new(
        repository: SiteRepository,
        icons: IconSet,
        default_year: f64,
        notice_ttl: Duration,
        events: broadcast::Sender<MapEvent>,
    ) -> Self {
        let mut session = Self {
            repository,
            view: ViewStateController::new(default_year),
            layer: MarkerLayer::new(icons),
            details: DetailsPanel::default(),
            notices: NoticeBoard::new(notice_ttl),
            load: LoadStatus::Pending,
            events,
            redraws: 0,
        };
        session.refresh();
        session
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    pub fn view(&self) -> &ViewState {
        self.view.state()
    }

    pub fn markers(&self) -> &[Marker] {
        self.layer.markers()
    }

    pub fn details(&self) -> &DetailsPanel {
        &self.details
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notices.current()
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.load
    }

    /// Number of full redraws so far, the initial one included.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }

    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            view: self.view.state().clone(),
            epic_menu_open: self.view.epic_menu_open(),
            epics: self.repository.epics(),
            markers: self.layer.markers().to_vec(),
            total_sites: self.repository.count(),
            details: self.details.clone(),
            notice: self.notices.current().cloned(),
            load: self.load.clone(),
        }
    }

    /// Recomputes the visible sites and redraws every marker.
    pub fn refresh(&mut self) -> &[Marker] {
        let sites = self.repository.all();
        let visible = visible_sites(&sites, self.view.state());
        self.layer.redraw(visible);
        self.redraws += 1;

        debug!(
            "Redrew {} of {} markers",
            self.layer.markers().len(),
            sites.len()
        );
        self.publish(MapEvent::Markers(MarkersData {
            view: self.view.state().clone(),
            epic_menu_open: self.view.epic_menu_open(),
            markers: self.layer.markers().to_vec(),
            total_sites: sites.len(),
        }));
        self.layer.markers()
    }

    pub fn set_theme(&mut self, theme: Theme) -> &[Marker] {
        self.view.set_theme(theme);
        self.refresh()
    }

    pub fn set_epic(&mut self, epic: impl Into<String>) -> &[Marker] {
        self.view.set_epic(epic);
        self.refresh()
    }

    pub fn set_year(&mut self, year: f64) -> &[Marker] {
        self.view.set_year(year);
        self.refresh()
    }

    pub fn begin_search(&mut self) -> u64 {
        self.view.begin_search()
    }

    /// Applies a debounced search; redraws only if it was still current.
    pub fn apply_search(&mut self, generation: u64, text: &str) -> bool {
        let applied = self.view.apply_search(generation, text);
        if applied {
            self.refresh();
        }
        applied
    }

    pub fn clear_search(&mut self) -> &[Marker] {
        self.view.clear_search();
        self.refresh()
    }

    /// Opens the details panel for the site at `index`.
    pub fn show_details(&mut self, index: usize) -> Option<&DetailsPanel> {
        let site = self.repository.get(index)?;
        self.details.show(&site);
        self.publish(MapEvent::Details(self.details.clone()));
        Some(&self.details)
    }

    pub fn close_details(&mut self) -> &DetailsPanel {
        self.details.close();
        self.publish(MapEvent::Details(self.details.clone()));
        &self.details
    }

    pub fn click_details(&mut self, target: ClickTarget) -> &DetailsPanel {
        if self.details.click(target) {
            self.publish(MapEvent::Details(self.details.clone()));
        }
        &self.details
    }

    pub fn details_image_failed(&mut self) -> &DetailsPanel {
        if self.details.image_failed() {
            self.publish(MapEvent::Details(self.details.clone()));
        }
        &self.details
    }

    /// Installs the loaded collection and draws it against the current view.
    pub fn install_sites(&mut self, sites: Vec<Site>) {
        let count = sites.len();
        self.repository.replace_all(sites);
        self.load = LoadStatus::Loaded {
            count,
            loaded_at: Utc::now(),
        };
        self.publish(MapEvent::Loaded(self.load.clone()));
        self.refresh();
    }

    /// Records a failed load and posts the on-screen notice. The marker layer
    /// is left as it is.
    pub fn load_failed(&mut self, err: &LoadError) -> Notice {
        self.load = LoadStatus::Failed {
            message: err.to_string(),
            failed_at: Utc::now(),
        };
        self.publish(MapEvent::Loaded(self.load.clone()));

        let notice = self.notices.post(LOAD_FAILED_MESSAGE);
        self.publish(MapEvent::Notice(notice.clone()));
        notice
    }

    pub fn dismiss_notice(&mut self, id: u64) -> bool {
        let dismissed = self.notices.dismiss(id);
        if dismissed {
            self.publish(MapEvent::NoticeDismissed { id });
        }
        dismissed
    }

    pub fn notice_ttl(&self) -> Duration {
        self.notices.ttl()
    }

    fn publish(&self, event: MapEvent) {
        // No connected page is fine
        let _ = self.events.send(event);
    }
}

/// Debounced search entry point. Each call supersedes the previous one; the
/// query is applied `window` after the last call. The handle resolves to
/// whether this call's query was the one applied.
pub async fn schedule_search(
    session: &SharedSession,
    text: String,
    window: Duration,
) -> JoinHandle<bool> {
    let generation = session.lock().await.begin_search();
    let session = session.clone();
    tokio::spawn(async move {
        tokio::time::sleep(window).await;
        session.lock().await.apply_search(generation, &text)
    })
}

/// Immediate search reset; cancels any pending debounced search.
pub async fn clear_search(session: &SharedSession) -> MapSnapshot {
    let mut guard = session.lock().await;
    guard.clear_search();
    guard.snapshot()
}

/// Removes notice `id` once its time on screen is over.
pub fn schedule_dismiss(session: &SharedSession, notice: &Notice) -> JoinHandle<bool> {
    let session = session.clone();
    let id = notice.id;
    let after = Duration::from_millis(notice.dismiss_after_ms);
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        session.lock().await.dismiss_notice(id)
    })
}

/// One-time site load. Runs in the background so the map is usable (and
/// empty) until it resolves. Failures are logged and shown as a notice.
pub fn spawn_load(session: SharedSession, source: DataSource) -> JoinHandle<()> {
    tokio::spawn(async move {
        match source.load().await {
            Ok(sites) => {
                session.lock().await.install_sites(sites);
            }
            Err(e) => {
                error!("Error loading {}: {}", source, e);
                let notice = session.lock().await.load_failed(&e);
                schedule_dismiss(&session, &notice);
            }
        }
        info!("Initial load from {} finished", source);
    })
}
