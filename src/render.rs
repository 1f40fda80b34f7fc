//! Marker renderer: turns visible sites into marker descriptions for the page.
//!
//! The page does the drawing with Leaflet; this module decides what each marker
//! looks like and keeps the layer consistent (every redraw replaces the whole
//! set).

use serde::Serialize;

use crate::assets;
use crate::constants::{DOT_ICON_ANCHOR, DOT_ICON_SIZE, ICON_ANCHOR, ICON_SIZE, POPUP_ANCHOR};
use crate::site::{Category, Site};

pub const DEFAULT_ICON: &str = "filters/monuments_and_architecture.svg";

const DOT_ICON_HTML: &str = r#"<div style="width: 20px; height: 20px; background-color: #3498db; border-radius: 50%; border: 2px solid white; box-shadow: 0 2px 4px rgba(0,0,0,0.3);"></div>"#;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Icon {
    Image {
        url: String,
        /// Shown by the browser when `url` fails to load.
        error_url: String,
        size: [u32; 2],
        anchor: [i32; 2],
        popup_anchor: [i32; 2],
    },
    /// Plain CSS dot, used when no image icon is available at all.
    Dot {
        html: String,
        class_name: String,
        size: [u32; 2],
        anchor: [i32; 2],
    },
}

/// Category to icon table with a deterministic fallback.
#[derive(Debug, Clone)]
pub struct IconSet {
    default_url: String,
    available: fn(&str) -> bool,
}

impl IconSet {
    /// Icons resolved against the embedded frontend assets.
    pub fn embedded() -> Self {
        Self::with_lookup(assets::exists)
    }

    pub fn with_lookup(available: fn(&str) -> bool) -> Self {
        Self {
            default_url: DEFAULT_ICON.to_string(),
            available,
        }
    }

    /// Icon path for a category, or `None` for categories without one.
    pub fn path_for(category: &Category) -> Option<&'static str> {
        match category {
            Category::MonumentsAndArchitecture => Some("filters/monuments_and_architecture.svg"),
            Category::FolkArtsAndHandcrafts => Some("filters/folk_arts_and_handcrafts.svg"),
            Category::MusicAndDance => Some("filters/music_and_dance.svg"),
            Category::Cuisine => Some("filters/cuisine.svg"),
            Category::FestivalsAndTraditions => Some("filters/festivals_and_traditions.svg"),
            Category::SpiritualAndPilgrimage => Some("filters/spiritual_and_pilgrimage.svg"),
            Category::NatureAndWildlife => Some("filters/nature_and_wildlife.svg"),
            Category::TalesAndEpics => Some("images/heritage_icon.svg"),
            Category::Other(_) => None,
        }
    }

    pub fn resolve(&self, category: &Category) -> Icon {
        let url = Self::path_for(category)
            .filter(|path| (self.available)(path))
            .map(str::to_string)
            .or_else(|| {
                (self.available)(&self.default_url).then(|| self.default_url.clone())
            });

        match url {
            Some(url) => Icon::Image {
                url: format!("/{}", url),
                error_url: format!("/{}", self.default_url),
                size: ICON_SIZE,
                anchor: ICON_ANCHOR,
                popup_anchor: POPUP_ANCHOR,
            },
            None => Icon::Dot {
                html: DOT_ICON_HTML.to_string(),
                class_name: "default-marker-icon".to_string(),
                size: DOT_ICON_SIZE,
                anchor: DOT_ICON_ANCHOR,
            },
        }
    }
}

/// Everything the page needs to draw one site.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub site_index: usize,
    pub coords: [f64; 2],
    pub icon: Icon,
    pub popup_html: String,
    /// Hover label: the site name only.
    pub tooltip: String,
}

pub fn render_marker(site: &Site, icons: &IconSet) -> Marker {
    Marker {
        site_index: site.index,
        coords: site.coords,
        icon: icons.resolve(&site.category),
        popup_html: popup_html(site),
        tooltip: site.name.clone(),
    }
}

/// Popup summary. The name and the image are the two regions that open the
/// details panel; both carry the site index for the page to report back.
pub fn popup_html(site: &Site) -> String {
    let name = html_escape(&site.name);
    let image = match &site.image_url {
        Some(url) => format!(
            r#"<img src="{}" alt="{}" class="popup-image" data-site="{}">"#,
            html_escape(url),
            name,
            site.index
        ),
        None => String::new(),
    };

    format!(
        r#"<div class="marker-popup">{image}<h4 class="popup-name" data-site="{index}">{name}</h4><div class="popup-info">{info}</div><div class="popup-year">Year: {year}</div></div>"#,
        image = image,
        index = site.index,
        name = name,
        info = html_escape(&site.info),
        year = html_escape(&site.year.text),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// The set of markers currently on the map.
#[derive(Debug, Clone)]
pub struct MarkerLayer {
    icons: IconSet,
    markers: Vec<Marker>,
}

impl MarkerLayer {
    pub fn new(icons: IconSet) -> Self {
        Self {
            icons,
            markers: Vec::new(),
        }
    }

    /// Clears the layer, then draws one marker per site.
    pub fn redraw<'a>(&mut self, sites: impl IntoIterator<Item = &'a Site>) -> &[Marker] {
        self.markers.clear();
        let icons = &self.icons;
        self.markers
            .extend(sites.into_iter().map(|site| render_marker(site, icons)));
        &self.markers
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::Year;

    fn site(index: usize, name: &str, category: Category) -> Site {
        Site {
            index,
            id: None,
            name: name.to_string(),
            category,
            epic: None,
            year: Year::number(1653.0),
            coords: [27.17, 78.04],
            info: "Marble mausoleum".to_string(),
            details: "placeholder".to_string(),
            image_url: None,
        }
    }

    fn everything(_: &str) -> bool {
        true
    }

    fn nothing(_: &str) -> bool {
        false
    }

    fn only_default(path: &str) -> bool {
        path == DEFAULT_ICON
    }

    #[test]
    fn known_category_gets_its_icon() {
        let icons = IconSet::with_lookup(everything);
        match icons.resolve(&Category::Cuisine) {
            Icon::Image { url, error_url, size, .. } => {
                assert_eq!(url, "/filters/cuisine.svg");
                assert_eq!(error_url, format!("/{}", DEFAULT_ICON));
                assert_eq!(size, [32, 37]);
            }
            other => panic!("unexpected icon {:?}", other),
        }
    }

    #[test]
    fn unknown_category_falls_back_to_default() {
        let icons = IconSet::with_lookup(everything);
        match icons.resolve(&Category::Other("space".into())) {
            Icon::Image { url, .. } => assert_eq!(url, format!("/{}", DEFAULT_ICON)),
            other => panic!("unexpected icon {:?}", other),
        }
    }

    #[test]
    fn missing_icon_resource_falls_back_to_default() {
        let icons = IconSet::with_lookup(only_default);
        match icons.resolve(&Category::MusicAndDance) {
            Icon::Image { url, .. } => assert_eq!(url, format!("/{}", DEFAULT_ICON)),
            other => panic!("unexpected icon {:?}", other),
        }
    }

    #[test]
    fn no_resources_gives_dot() {
        let icons = IconSet::with_lookup(nothing);
        assert!(matches!(icons.resolve(&Category::Cuisine), Icon::Dot { .. }));
    }

    #[test]
    fn embedded_icons_cover_every_category() {
        for category in Category::KNOWN.iter() {
            let path = IconSet::path_for(category).unwrap();
            assert!(assets::exists(path), "missing icon {}", path);
        }
    }

    #[test]
    fn popup_has_clickable_name_and_image() {
        let mut s = site(3, "Taj Mahal", Category::MonumentsAndArchitecture);
        s.image_url = Some("https://example.org/taj.jpg".to_string());
        let html = popup_html(&s);

        assert!(html.contains(r#"class="popup-name" data-site="3">Taj Mahal</h4>"#));
        assert!(html.contains(r#"class="popup-image" data-site="3""#));
        assert!(html.contains("Year: 1653"));
    }

    #[test]
    fn popup_without_image_has_no_img() {
        let html = popup_html(&site(0, "Diwali", Category::FestivalsAndTraditions));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn popup_escapes_markup() {
        let html = popup_html(&site(0, "<script>x</script>", Category::Cuisine));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn tooltip_is_name_only() {
        let icons = IconSet::with_lookup(everything);
        let marker = render_marker(&site(0, "Hampi", Category::MonumentsAndArchitecture), &icons);
        assert_eq!(marker.tooltip, "Hampi");
    }

    #[test]
    fn redraw_replaces_previous_markers() {
        let mut layer = MarkerLayer::new(IconSet::with_lookup(everything));
        let a = site(0, "A", Category::Cuisine);
        let b = site(1, "B", Category::Cuisine);

        layer.redraw([&a, &b]);
        assert_eq!(layer.markers().len(), 2);

        layer.redraw([&b]);
        let indexes: Vec<_> = layer.markers().iter().map(|m| m.site_index).collect();
        assert_eq!(indexes, vec![1]);

        layer.redraw(std::iter::empty());
        assert!(layer.is_empty());
    }
}
