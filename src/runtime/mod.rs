//! Async runtime abstraction for background loads
//!
//! Callback-style and tracked loads run on whatever runtime the caller
//! provides through [`AsyncSpawner`].

pub mod mock;
#[cfg(feature = "runtime-tokio")]
pub mod tokio_impl;

use std::fmt::Debug;
use std::future::Future;

/// Handle to a spawned load task
///
/// Type-erased so each runtime can hand back its own join handle.
#[derive(Debug)]
pub struct JoinHandle {
    inner: Box<dyn std::any::Any + Send>,
}

impl JoinHandle {
    /// Create a new join handle
    pub fn new<T: Send + 'static>(handle: T) -> Self {
        Self {
            inner: Box::new(handle),
        }
    }

    /// Try to downcast to the runtime's own handle type
    pub fn downcast<T: 'static>(self) -> Option<T> {
        self.inner.downcast::<T>().ok().map(|b| *b)
    }
}

/// Async task spawner trait
///
/// # Example
/// ```ignore
/// let spawner = TokioSpawner::new();
/// loader.load(&spawner, "wave.vrma", None, |result| { /* ... */ }, None);
/// ```
pub trait AsyncSpawner: Send + Sync + Clone + Debug {
    /// Spawn a load task in the background
    fn spawn<F>(&self, task: F) -> JoinHandle
    where
        F: Future<Output = ()> + Send + 'static;

    /// Get the name of this runtime (for debugging)
    fn runtime_name(&self) -> &'static str;

    /// Block on a future (if supported by the runtime)
    ///
    /// Returns None if blocking is not supported.
    fn block_on<F, T>(&self, _future: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        None
    }
}

pub use mock::{MockSpawnBehavior, MockSpawner};

#[cfg(feature = "runtime-tokio")]
pub use tokio_impl::TokioSpawner;
