use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_YEAR;
use crate::site::Category;

/// The theme button that is currently active: every category, or exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Theme {
    #[default]
    All,
    Category(Category),
}

impl Theme {
    pub fn is_tales_and_epics(&self) -> bool {
        matches!(self, Theme::Category(Category::TalesAndEpics))
    }
}

impl From<String> for Theme {
    fn from(value: String) -> Self {
        if value == "all" {
            Theme::All
        } else {
            Theme::Category(Category::from(value))
        }
    }
}

impl From<&str> for Theme {
    fn from(value: &str) -> Self {
        Theme::from(value.to_string())
    }
}

impl From<Theme> for String {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::All => "all".to_string(),
            Theme::Category(category) => category.into(),
        }
    }
}

/// Current filter configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub active_theme: Theme,
    pub active_epic: Option<String>,
    pub active_year: f64,
    pub search_query: String,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            active_theme: Theme::All,
            active_epic: None,
            active_year: DEFAULT_YEAR,
            search_query: String::new(),
        }
    }
}

/// Owns the [`ViewState`] and applies the control-level transitions to it.
///
/// The controller only changes state. Recomputing and redrawing after a
/// transition is the caller's job (see `session::MapSession`).
#[derive(Debug, Clone)]
pub struct ViewStateController {
    state: ViewState,
    epic_menu_open: bool,
    search_generation: u64,
}

impl ViewStateController {
    pub fn new(default_year: f64) -> Self {
        Self {
            state: ViewState {
                active_year: default_year,
                ..ViewState::default()
            },
            epic_menu_open: false,
            search_generation: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Whether the epic sub-filter buttons are shown.
    pub fn epic_menu_open(&self) -> bool {
        self.epic_menu_open
    }

    pub fn set_theme(&mut self, theme: Theme) {
        let reselected = self.state.active_theme == theme;
        self.state.active_theme = theme;

        if self.state.active_theme.is_tales_and_epics() && !reselected {
            self.epic_menu_open = true;
        } else {
            // Leaving tales and epics, or toggling it off
            self.epic_menu_open = false;
            self.state.active_epic = None;
        }
    }

    pub fn set_epic(&mut self, epic: impl Into<String>) {
        self.state.active_theme = Theme::Category(Category::TalesAndEpics);
        self.state.active_epic = Some(epic.into());
        self.epic_menu_open = true;
    }

    pub fn set_year(&mut self, year: f64) {
        self.state.active_year = year;
    }

    /// Starts a debounced search and returns its generation. Only the most
    /// recent generation may later be applied.
    pub fn begin_search(&mut self) -> u64 {
        self.search_generation += 1;
        self.search_generation
    }

    /// Applies a debounced search if no newer search or clear happened since
    /// `generation` was issued. Returns whether the query was applied.
    pub fn apply_search(&mut self, generation: u64, text: &str) -> bool {
        if generation != self.search_generation {
            return false;
        }
        self.state.search_query = text.trim().to_string();
        true
    }

    /// Clears the query immediately and invalidates any pending search.
    pub fn clear_search(&mut self) {
        self.search_generation += 1;
        self.state.search_query.clear();
    }
}

impl Default for ViewStateController {
    fn default() -> Self {
        Self::new(DEFAULT_YEAR)
    }
}
