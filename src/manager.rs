//! Shared load progress and failure tracking
//!
//! Every loader reports to a [`LoadingManager`]: one `item_start` per fetch,
//! one `item_end` when the fetch settles, and an `item_error` on failure.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

type UrlCallback = Arc<dyn Fn(&str) + Send + Sync>;
type ProgressCallback = Arc<dyn Fn(&str, usize, usize) + Send + Sync>;
type DoneCallback = Arc<dyn Fn() + Send + Sync>;
type UrlModifier = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Clone a registered callback out so no lock is held while it runs
fn registered<T: ?Sized>(slot: &RwLock<Option<Arc<T>>>) -> Option<Arc<T>> {
    slot.read().clone()
}

/// Tracks outstanding items and failures across loaders
#[derive(Default)]
pub struct LoadingManager {
    items_loaded: AtomicUsize,
    items_total: AtomicUsize,
    failed: RwLock<Vec<String>>,
    url_modifier: RwLock<Option<UrlModifier>>,
    on_start: RwLock<Option<ProgressCallback>>,
    on_progress: RwLock<Option<ProgressCallback>>,
    on_load: RwLock<Option<DoneCallback>>,
    on_error: RwLock<Option<UrlCallback>>,
}

impl std::fmt::Debug for LoadingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingManager")
            .field("items_loaded", &self.items_loaded())
            .field("items_total", &self.items_total())
            .field("failed", &*self.failed.read())
            .finish()
    }
}

impl LoadingManager {
    /// Create a manager with no callbacks
    pub fn new() -> Self {
        Self::default()
    }

    /// Called with `(url, loaded, total)` when the first item of a batch starts
    pub fn set_on_start(&self, callback: impl Fn(&str, usize, usize) + Send + Sync + 'static) {
        *self.on_start.write() = Some(Arc::new(callback));
    }

    /// Called with `(url, loaded, total)` each time an item settles
    pub fn set_on_progress(&self, callback: impl Fn(&str, usize, usize) + Send + Sync + 'static) {
        *self.on_progress.write() = Some(Arc::new(callback));
    }

    /// Called once every started item has settled
    pub fn set_on_load(&self, callback: impl Fn() + Send + Sync + 'static) {
        *self.on_load.write() = Some(Arc::new(callback));
    }

    /// Called with the URL of each failed item
    pub fn set_on_error(&self, callback: impl Fn(&str) + Send + Sync + 'static) {
        *self.on_error.write() = Some(Arc::new(callback));
    }

    /// Rewrite every URL before it is fetched
    pub fn set_url_modifier(&self, modifier: impl Fn(&str) -> String + Send + Sync + 'static) {
        *self.url_modifier.write() = Some(Arc::new(modifier));
    }

    /// Apply the URL modifier, if any
    pub fn resolve_url(&self, url: &str) -> String {
        match registered(&self.url_modifier) {
            Some(modifier) => modifier(url),
            None => url.to_string(),
        }
    }

    /// Record that an item started loading
    pub fn item_start(&self, url: &str) {
        let total = self.items_total.fetch_add(1, Ordering::SeqCst) + 1;
        let loaded = self.items_loaded.load(Ordering::SeqCst);

        if loaded + 1 == total {
            if let Some(callback) = registered(&self.on_start) {
                callback(url, loaded, total);
            }
        }
        log::debug!("Loading {url} ({loaded}/{total})");
    }

    /// Record that an item settled, successfully or not
    pub fn item_end(&self, url: &str) {
        let loaded = self.items_loaded.fetch_add(1, Ordering::SeqCst) + 1;
        let total = self.items_total.load(Ordering::SeqCst);

        if let Some(callback) = registered(&self.on_progress) {
            callback(url, loaded, total);
        }
        log::debug!("Finished {url} ({loaded}/{total})");

        if loaded == total {
            if let Some(callback) = registered(&self.on_load) {
                callback();
            }
        }
    }

    /// Record that an item failed
    pub fn item_error(&self, url: &str) {
        self.failed.write().push(url.to_string());
        if let Some(callback) = registered(&self.on_error) {
            callback(url);
        }
    }

    /// Items that have settled
    pub fn items_loaded(&self) -> usize {
        self.items_loaded.load(Ordering::SeqCst)
    }

    /// Items that have started
    pub fn items_total(&self) -> usize {
        self.items_total.load(Ordering::SeqCst)
    }

    /// Whether any started item has not settled yet
    pub fn is_loading(&self) -> bool {
        self.items_loaded() < self.items_total()
    }

    /// URLs of failed items, in failure order
    pub fn failed_items(&self) -> Vec<String> {
        self.failed.read().clone()
    }
}

/// A thread-safe shared handle to a LoadingManager
#[derive(Debug, Clone, Default)]
pub struct LoadingManagerHandle(Arc<LoadingManager>);

impl LoadingManagerHandle {
    /// Create a handle to a fresh manager
    pub fn new() -> Self {
        Self(Arc::new(LoadingManager::new()))
    }

    /// Get a reference to the underlying manager
    pub fn inner(&self) -> &LoadingManager {
        &self.0
    }
}

impl From<LoadingManager> for LoadingManagerHandle {
    fn from(manager: LoadingManager) -> Self {
        Self(Arc::new(manager))
    }
}

impl std::ops::Deref for LoadingManagerHandle {
    type Target = LoadingManager;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
