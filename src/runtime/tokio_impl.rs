//! Tokio runtime integration

use super::{AsyncSpawner, JoinHandle};
use std::future::Future;

/// Spawns load tasks on the current Tokio runtime
///
/// The returned [`JoinHandle`] wraps a `tokio::task::JoinHandle<()>`.
#[derive(Clone, Debug, Default, Copy)]
pub struct TokioSpawner;

impl TokioSpawner {
    /// Create a new Tokio spawner
    pub fn new() -> Self {
        Self
    }
}

impl AsyncSpawner for TokioSpawner {
    fn spawn<F>(&self, task: F) -> JoinHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        JoinHandle::new(tokio::spawn(task))
    }

    fn runtime_name(&self) -> &'static str {
        "Tokio"
    }

    fn block_on<F, T>(&self, future: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            // already inside a runtime
            Some(tokio::task::block_in_place(|| handle.block_on(future)))
        } else {
            let rt = tokio::runtime::Runtime::new().ok()?;
            Some(rt.block_on(future))
        }
    }
}
