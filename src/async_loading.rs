//! Background clip loading with state tracking
//!
//! A tracked load has two states: it is awaiting its fetch, then it is
//! completed, either with a result or with an error message. There are no
//! retries and no cancellation.

use crate::loader::LoadResult;
use parking_lot::RwLock as SyncRwLock;
use std::sync::Arc;

/// Represents the current state of a tracked load
#[derive(Debug, Clone)]
pub enum LoadState {
    /// Awaiting the fetch (and parse)
    Pending,

    /// Loading completed successfully
    Completed(LoadResult),

    /// Loading failed with an error message
    Failed(String),
}

impl LoadState {
    /// Whether the load has settled, successfully or not
    pub fn is_settled(&self) -> bool {
        !matches!(self, LoadState::Pending)
    }
}

/// Handle to a clip loading in the background
#[derive(Debug, Clone)]
pub struct AsyncClipHandle {
    url: String,
    state: Arc<SyncRwLock<LoadState>>,
}

impl AsyncClipHandle {
    /// Create a pending handle for a URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: Arc::new(SyncRwLock::new(LoadState::Pending)),
        }
    }

    /// URL this handle was created for
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the current load state
    pub fn state(&self) -> LoadState {
        self.state.read().clone()
    }

    /// Check if loading completed successfully
    pub fn is_ready(&self) -> bool {
        matches!(*self.state.read(), LoadState::Completed(_))
    }

    /// Check if loading failed
    pub fn is_failed(&self) -> bool {
        matches!(*self.state.read(), LoadState::Failed(_))
    }

    /// Check if loading is still in progress
    pub fn is_loading(&self) -> bool {
        matches!(*self.state.read(), LoadState::Pending)
    }

    /// Get the result if loading completed successfully
    pub fn result(&self) -> Option<LoadResult> {
        match &*self.state.read() {
            LoadState::Completed(result) => Some(result.clone()),
            _ => None,
        }
    }

    /// Get the error message if loading failed
    pub fn error(&self) -> Option<String> {
        match &*self.state.read() {
            LoadState::Failed(message) => Some(message.clone()),
            _ => None,
        }
    }

    /// Get the state arc for the task driving the load
    pub(crate) fn state_arc(&self) -> Arc<SyncRwLock<LoadState>> {
        Arc::clone(&self.state)
    }

    /// Set the state (for load orchestration outside the loader)
    pub fn set_state(&self, state: LoadState) {
        *self.state.write() = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_handle_is_pending() {
        let handle = AsyncClipHandle::new("idle.vrma");

        assert_eq!(handle.url(), "idle.vrma");
        assert!(handle.is_loading());
        assert!(!handle.is_ready());
        assert!(!handle.is_failed());
        assert!(!handle.state().is_settled());
    }

    #[test]
    fn test_state_transitions() {
        let handle = AsyncClipHandle::new("idle.vrma");

        handle.set_state(LoadState::Completed(LoadResult::default()));
        assert!(handle.is_ready());
        assert!(handle.result().is_some());
        assert!(handle.error().is_none());

        handle.set_state(LoadState::Failed("boom".to_string()));
        assert!(handle.is_failed());
        assert_eq!(handle.error().as_deref(), Some("boom"));
        assert!(handle.state().is_settled());
    }
}
