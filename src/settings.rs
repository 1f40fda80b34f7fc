use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_DATA_SOURCE, DEFAULT_MAX_YEAR, DEFAULT_MIN_YEAR, DEFAULT_PORT, DEFAULT_YEAR,
    NOTICE_SECS, SEARCH_DEBOUNCE_MS,
};
use crate::repository::DataSource;

pub const CONFIG_ENV: &str = "HERITAGE_MAP_CONFIG";
const CONFIG_FILE: &str = "heritage_map.ini";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Path or http(s) URL of the site collection.
    pub data_source: String,
    pub port: u16,
    pub default_year: f64,
    pub min_year: f64,
    pub max_year: f64,
    pub search_debounce_ms: u64,
    pub notice_secs: u64,
    pub auto_open_browser: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            port: DEFAULT_PORT,
            default_year: DEFAULT_YEAR,
            min_year: DEFAULT_MIN_YEAR,
            max_year: DEFAULT_MAX_YEAR,
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
            notice_secs: NOTICE_SECS,
            auto_open_browser: false,
        }
    }
}

impl Settings {
    /// Loads `heritage_map.ini`; a missing file yields the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Settings::default());
        }
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Parses `key = value` lines. Comments start with `#` or `;`; values
    /// that do not parse keep their default.
    pub fn parse(content: &str) -> Self {
        let mut settings = Settings::default();
        let mut config_map = HashMap::new();

        for line in content.lines() {
            let line = line.trim();
            if line.starts_with('#') || line.starts_with(';') || line.is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config_map.insert(key.trim(), value.trim().trim_matches('"'));
            }
        }

        if let Some(source) = config_map.get("data_source").filter(|s| !s.is_empty()) {
            settings.data_source = source.to_string();
        }
        if let Some(port) = config_map.get("port").and_then(|v| v.parse().ok()) {
            settings.port = port;
        }
        if let Some(year) = parse_year(config_map.get("default_year")) {
            settings.default_year = year;
        }
        if let Some(year) = parse_year(config_map.get("min_year")) {
            settings.min_year = year;
        }
        if let Some(year) = parse_year(config_map.get("max_year")) {
            settings.max_year = year;
        }
        if let Some(ms) = config_map.get("search_debounce_ms").and_then(|v| v.parse().ok()) {
            settings.search_debounce_ms = ms;
        }
        if let Some(secs) = config_map.get("notice_secs").and_then(|v| v.parse().ok()) {
            settings.notice_secs = secs;
        }
        if let Some(auto_open) = config_map.get("auto_open_browser").and_then(|v| v.parse().ok()) {
            settings.auto_open_browser = auto_open;
        }

        settings
    }

    pub fn data_source(&self) -> DataSource {
        DataSource::parse(&self.data_source)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn notice_ttl(&self) -> Duration {
        Duration::from_secs(self.notice_secs)
    }

    /// `$HERITAGE_MAP_CONFIG`, else `heritage_map.ini` next to the executable
    /// (the crate root when running from `target/`).
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }

        let mut path = std::env::current_exe()
            .unwrap_or_default()
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        if path.ends_with("target/debug") || path.ends_with("target/release") {
            path.pop();
            path.pop();
        }
        path.push(CONFIG_FILE);
        path
    }
}

fn parse_year(value: Option<&&str>) -> Option<f64> {
    value
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}
