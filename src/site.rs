use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::warn;

use crate::constants::DETAILS_PLACEHOLDER;

/// Top-level classification of a heritage site.
///
/// Unknown tags are kept verbatim in [`Category::Other`] so a record with a
/// category the map has no icon for still loads and still filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    MonumentsAndArchitecture,
    FolkArtsAndHandcrafts,
    MusicAndDance,
    Cuisine,
    FestivalsAndTraditions,
    SpiritualAndPilgrimage,
    NatureAndWildlife,
    TalesAndEpics,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 8] = [
        Category::MonumentsAndArchitecture,
        Category::FolkArtsAndHandcrafts,
        Category::MusicAndDance,
        Category::Cuisine,
        Category::FestivalsAndTraditions,
        Category::SpiritualAndPilgrimage,
        Category::NatureAndWildlife,
        Category::TalesAndEpics,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Category::MonumentsAndArchitecture => "monuments_and_architecture",
            Category::FolkArtsAndHandcrafts => "folk_arts_and_handcrafts",
            Category::MusicAndDance => "music_and_dance",
            Category::Cuisine => "cuisine",
            Category::FestivalsAndTraditions => "festivals_and_traditions",
            Category::SpiritualAndPilgrimage => "spiritual_and_pilgrimage",
            Category::NatureAndWildlife => "nature_and_wildlife",
            Category::TalesAndEpics => "tales_and_epics",
            Category::Other(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }
}

impl From<String> for Category {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "monuments_and_architecture" => Category::MonumentsAndArchitecture,
            "folk_arts_and_handcrafts" => Category::FolkArtsAndHandcrafts,
            "music_and_dance" => Category::MusicAndDance,
            "cuisine" => Category::Cuisine,
            "festivals_and_traditions" => Category::FestivalsAndTraditions,
            "spiritual_and_pilgrimage" => Category::SpiritualAndPilgrimage,
            "nature_and_wildlife" => Category::NatureAndWildlife,
            "tales_and_epics" => Category::TalesAndEpics,
            _ => Category::Other(tag),
        }
    }
}

impl From<&str> for Category {
    fn from(tag: &str) -> Self {
        Category::from(tag.to_string())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other(String::new())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A site's year as written in the data file.
///
/// `text` is what gets displayed and searched. `value` is only set when the
/// text coerces to a number; a year without a value never passes the year
/// filter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "RawYear", into = "String")]
pub struct Year {
    pub text: String,
    pub value: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawYear {
    Number(serde_json::Number),
    Text(String),
    Missing(()),
}

impl From<RawYear> for Year {
    fn from(raw: RawYear) -> Self {
        match raw {
            RawYear::Number(n) => Year {
                text: number_text(&n),
                value: n.as_f64(),
            },
            RawYear::Text(text) => Year::parse(&text),
            RawYear::Missing(()) => Year::default(),
        }
    }
}

// Whole floats print without a fraction, the way the page would show them
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < 1e15 => (v as i64).to_string(),
        _ => n.to_string(),
    }
}

impl From<Year> for String {
    fn from(year: Year) -> Self {
        year.text
    }
}

impl Year {
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let value = if trimmed.is_empty() {
            // Number("") is 0 in the browser; a blank year is treated as missing instead.
            None
        } else {
            trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
        };
        Year {
            text: text.to_string(),
            value,
        }
    }

    pub fn number(value: f64) -> Self {
        Year {
            text: value.to_string(),
            value: Some(value),
        }
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

// Record as it appears in the data file. A null or wrong-typed field counts
// as absent instead of failing the record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiteRecord {
    pub id: Option<Value>,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_category")]
    pub category: Category,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub epic: Option<String>,
    #[serde(deserialize_with = "lenient_year")]
    pub year: Year,
    #[serde(deserialize_with = "lenient_coords")]
    pub coords: Option<[f64; 2]>,
    #[serde(deserialize_with = "lenient_text")]
    pub info: String,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub details: Option<String>,
    #[serde(deserialize_with = "lenient_optional_text")]
    pub image_url: Option<String>,
}

fn lenient_optional_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(text) => Some(text),
        _ => None,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(lenient_optional_text(d)?.unwrap_or_default())
}

fn lenient_category<'de, D: Deserializer<'de>>(d: D) -> Result<Category, D::Error> {
    Ok(lenient_optional_text(d)?.map(Category::from).unwrap_or_default())
}

fn lenient_year<'de, D: Deserializer<'de>>(d: D) -> Result<Year, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => RawYear::Number(n).into(),
        Value::String(text) => Year::parse(&text),
        _ => Year::default(),
    })
}

fn lenient_coords<'de, D: Deserializer<'de>>(d: D) -> Result<Option<[f64; 2]>, D::Error> {
    let value = Value::deserialize(d)?;
    let coords = match value.as_array().map(Vec::as_slice) {
        Some([lat, lng]) => lat.as_f64().zip(lng.as_f64()),
        _ => None,
    };
    Ok(coords
        .filter(|(lat, lng)| lat.is_finite() && lng.is_finite())
        .map(|(lat, lng)| [lat, lng]))
}

/// A loaded, normalised heritage site. Read-only once the repository is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Site {
    /// Position in the loaded collection; the stable handle the page uses.
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub name: String,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epic: Option<String>,
    pub year: Year,
    pub coords: [f64; 2],
    pub info: String,
    pub details: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Site {
    /// Applies the load-time defaults: placeholder details, empty image urls
    /// dropped. Returns `None` when the record has no usable coordinates,
    /// since it could never be drawn.
    pub fn from_record(index: usize, record: SiteRecord) -> Option<Self> {
        let coords = record.coords?;
        let details = record
            .details
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DETAILS_PLACEHOLDER.to_string());
        let image_url = record.image_url.filter(|url| !url.trim().is_empty());

        Some(Site {
            index,
            id: record.id,
            name: record.name,
            category: record.category,
            epic: record.epic,
            year: record.year,
            coords,
            info: record.info,
            details,
            image_url,
        })
    }
}

/// Decodes a JSON array of site records and normalises each one.
///
/// Only a document that is not an array fails. A record that is not an
/// object or has no usable `coords` is skipped with a warning; indexes are
/// assigned over the kept records so they stay contiguous.
pub fn parse_sites(json: &[u8]) -> serde_json::Result<Vec<Site>> {
    let records: Vec<Value> = serde_json::from_slice(json)?;
    let mut sites = Vec::with_capacity(records.len());

    for (position, value) in records.into_iter().enumerate() {
        let record = match SiteRecord::deserialize(value) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping site record {}: {}", position, e);
                continue;
            }
        };
        let name = record.name.clone();
        match Site::from_record(sites.len(), record) {
            Some(site) => sites.push(site),
            None => warn!(
                "Skipping site record {} ({:?}): no usable coords",
                position, name
            ),
        }
    }

    Ok(sites)
}
