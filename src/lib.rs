//! Heritage site map.
//!
//! Loads a collection of heritage sites once, filters it by theme, epic, year
//! and free-text search, renders the visible sites as map markers and serves
//! the result to a Leaflet page.

pub mod assets;
pub mod browser;
pub mod constants;
pub mod details;
pub mod events;
pub mod filter;
pub mod notify;
pub mod render;
pub mod repository;
pub mod server;
pub mod session;
pub mod settings;
pub mod site;
pub mod view_state;

pub use repository::{DataSource, LoadError, SiteRepository};
pub use session::{MapSession, SharedSession};
pub use settings::Settings;
pub use site::{Category, Site};
pub use view_state::{Theme, ViewState};
