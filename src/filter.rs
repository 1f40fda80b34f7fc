//! Filter engine: decides which sites are visible for a given view state.
//!
//! Every rule is a free function so each can be checked on its own; [`matches`]
//! is their conjunction and [`visible_sites`] applies it to a collection.

use crate::site::{Category, Site};
use crate::view_state::{Theme, ViewState};

/// Theme rule, including the epic sub-filter under tales and epics.
pub fn matches_theme(site: &Site, theme: &Theme, epic: Option<&str>) -> bool {
    let in_theme = match theme {
        Theme::All => true,
        Theme::Category(category) => site.category == *category,
    };
    if !in_theme {
        return false;
    }

    match (theme, epic) {
        (Theme::Category(Category::TalesAndEpics), Some(epic)) if !epic.trim().is_empty() => {
            // Epic names are offered trimmed, so compare them trimmed
            let site_epic = site.epic.as_deref().unwrap_or("");
            site_epic.trim().to_lowercase() == epic.trim().to_lowercase()
        }
        _ => true,
    }
}

/// Inclusive upper bound on the site's year. Years that do not coerce to a
/// number never match.
pub fn matches_year(site: &Site, active_year: f64) -> bool {
    match site.year.value {
        Some(year) => year <= active_year,
        None => false,
    }
}

/// Case-insensitive substring search over name, info, details, category and
/// the year as written. An empty query matches everything.
pub fn matches_search(site: &Site, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();

    [
        site.name.as_str(),
        site.info.as_str(),
        site.details.as_str(),
        site.category.as_str(),
        site.year.text.as_str(),
    ]
    .iter()
    .filter(|field| !field.is_empty())
    .any(|field| field.to_lowercase().contains(&needle))
}

pub fn matches(site: &Site, state: &ViewState) -> bool {
    matches_theme(site, &state.active_theme, state.active_epic.as_deref())
        && matches_year(site, state.active_year)
        && matches_search(site, &state.search_query)
}

/// Full recompute of the visible subset, in repository order.
pub fn visible_sites<'a>(sites: &'a [Site], state: &ViewState) -> Vec<&'a Site> {
    sites.iter().filter(|site| matches(site, state)).collect()
}
