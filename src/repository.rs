use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use reqwest::header;
use thiserror::Error;
use tracing::{debug, info};

use crate::site::{parse_sites, Site};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("invalid site data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the site collection is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            DataSource::Url(value.to_string())
        } else {
            DataSource::File(PathBuf::from(value))
        }
    }

    /// Reads the raw bytes. URLs are requested with caching disabled.
    pub async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        match self {
            DataSource::File(path) => {
                debug!("Reading sites from {}", path.display());
                tokio::fs::read(path).await.map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })
            }
            DataSource::Url(url) => {
                debug!("Fetching sites from {}", url);
                let response = reqwest::Client::new()
                    .get(url)
                    .header(header::CACHE_CONTROL, "no-cache")
                    .header(header::PRAGMA, "no-cache")
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        status: status.as_u16(),
                        reason: status.canonical_reason().unwrap_or("").to_string(),
                    });
                }
                Ok(response.bytes().await?.to_vec())
            }
        }
    }

    /// Fetches and normalises the whole collection.
    pub async fn load(&self) -> Result<Vec<Site>, LoadError> {
        let bytes = self.fetch().await?;
        let sites = parse_sites(&bytes)?;
        info!("Successfully loaded {} heritage sites", sites.len());
        Ok(sites)
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::File(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => f.write_str(url),
        }
    }
}

/// Shared handle to the loaded sites.
///
/// Empty until the load resolves; filled exactly once afterwards.
#[derive(Clone, Default)]
pub struct SiteRepository {
    sites: Arc<RwLock<Arc<Vec<Site>>>>,
}

impl SiteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sites(sites: Vec<Site>) -> Self {
        let repository = Self::new();
        repository.replace_all(sites);
        repository
    }

    pub fn replace_all(&self, sites: Vec<Site>) {
        let mut guard = self.sites.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(sites);
    }

    /// Cheap snapshot of the current collection.
    pub fn all(&self) -> Arc<Vec<Site>> {
        self.sites
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get(&self, index: usize) -> Option<Site> {
        self.all().get(index).cloned()
    }

    pub fn count(&self) -> usize {
        self.all().len()
    }

    /// Distinct epic names among tales and epics sites, first spelling wins.
    pub fn epics(&self) -> Vec<String> {
        let sites = self.all();
        let mut seen: Vec<String> = Vec::new();
        let mut epics = Vec::new();
        for epic in sites.iter().filter_map(|s| s.epic.as_deref()) {
            let key = epic.trim().to_lowercase();
            if key.is_empty() || seen.contains(&key) {
                continue;
            }
            seen.push(key);
            epics.push(epic.trim().to_string());
        }
        epics
    }
}
