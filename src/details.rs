use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::DETAILS_PLACEHOLDER;
use crate::site::Site;

/// Content of the open details panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsView {
    pub site_index: usize,
    /// `None` hides the image element.
    pub image_url: Option<String>,
    pub image_alt: String,
    pub name: String,
    pub year: String,
    pub info: String,
    pub details: String,
}

impl DetailsView {
    fn from_site(site: &Site) -> Self {
        let details = if site.details.is_empty() {
            DETAILS_PLACEHOLDER.to_string()
        } else {
            site.details.clone()
        };

        Self {
            site_index: site.index,
            image_url: site.image_url.clone(),
            image_alt: site.name.clone(),
            name: site.name.clone(),
            year: site.year.text.clone(),
            info: site.info.clone(),
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(tag = "state", content = "view", rename_all = "snake_case")]
pub enum DetailsPanel {
    #[default]
    Closed,
    Open(DetailsView),
}

/// Where a click on the panel landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickTarget {
    /// The dimmed region around the panel content.
    Background,
    Content,
}

impl DetailsPanel {
    /// Opens the panel on `site`, replacing whatever was shown.
    pub fn show(&mut self, site: &Site) {
        *self = DetailsPanel::Open(DetailsView::from_site(site));
    }

    pub fn close(&mut self) {
        *self = DetailsPanel::Closed;
    }

    /// Returns whether the click closed the panel.
    pub fn click(&mut self, target: ClickTarget) -> bool {
        match (target, self.is_open()) {
            (ClickTarget::Background, true) => {
                self.close();
                true
            }
            _ => false,
        }
    }

    /// The browser could not load the panel image: hide it, keep the rest.
    /// Returns whether an image was hidden.
    pub fn image_failed(&mut self) -> bool {
        match self {
            DetailsPanel::Open(view) => match view.image_url.take() {
                Some(url) => {
                    warn!("Failed to load image for {}: {}", view.name, url);
                    true
                }
                None => false,
            },
            DetailsPanel::Closed => false,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, DetailsPanel::Open(_))
    }

    pub fn view(&self) -> Option<&DetailsView> {
        match self {
            DetailsPanel::Open(view) => Some(view),
            DetailsPanel::Closed => None,
        }
    }
}
