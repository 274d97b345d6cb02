//! Byte fetching for the loader
//!
//! The loader never reads files or sockets itself; it hands a [`FetchRequest`]
//! to a [`Fetcher`] and parses whatever bytes come back.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use thiserror::Error;

/// Error type for fetch operations
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the caller intends to read the response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Raw bytes
    #[default]
    ArrayBuffer,
    /// UTF-8 text
    Text,
}

/// A single fetch
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchRequest {
    /// Fully resolved locator
    pub url: String,
    /// Extra request headers
    pub headers: BTreeMap<String, String>,
    /// Whether credentials (cookies, auth) should accompany the request
    pub with_credentials: bool,
    pub response_type: ResponseType,
}

impl FetchRequest {
    /// Create a byte request for a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Source of raw bytes
///
/// Uses async-trait for dyn compatibility
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the bytes for a request
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError>;
}

/// Fetches from the local filesystem
///
/// Headers and credentials have no meaning here and are ignored.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
}

impl FileFetcher {
    /// Create a fetcher resolving relative URLs against the working directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher resolving relative URLs against a root directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, url: &str) -> Result<PathBuf, FetchError> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        if path.is_empty() {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }
        if path.contains("://") {
            return Err(FetchError::InvalidUrl(format!(
                "{url} (only file paths are supported)"
            )));
        }

        let path = PathBuf::from(path);
        match &self.root {
            Some(root) if path.is_relative() => Ok(root.join(path)),
            _ => Ok(path),
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        let path = self.resolve(&request.url)?;
        match std::fs::read(&path) {
            Ok(data) => {
                log::debug!("Fetched {} bytes from {}", data.len(), path.display());
                Ok(data)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(FetchError::NotFound(request.url.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Serves bytes from memory and records every request it sees
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    requests: RwLock<Vec<FetchRequest>>,
}

impl MemoryFetcher {
    /// Create an empty fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Register content for a URL, replacing any earlier entry
    pub fn insert(&self, url: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.entries.write().insert(url.into(), data.into());
    }

    /// Builder form of [`MemoryFetcher::insert`]
    pub fn with_entry(self, url: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        self.insert(url, data);
        self
    }

    /// All requests received so far, in order
    pub fn requests(&self) -> Vec<FetchRequest> {
        self.requests.read().clone()
    }
}

#[async_trait::async_trait]
impl Fetcher for MemoryFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<u8>, FetchError> {
        self.requests.write().push(request.clone());
        self.entries
            .read()
            .get(&request.url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(request.url.clone()))
    }
}
