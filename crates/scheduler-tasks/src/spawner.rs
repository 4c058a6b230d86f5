use std::sync::Arc;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::task::{TaskHandle, TaskResult};

#[derive(Debug)]
pub(crate) struct Inner {
    pub(crate) handle: Handle,
    pub(crate) tracker: TaskTracker,
    pub(crate) on_cancel: CancellationToken,
    pub(crate) blocking_pool: Arc<rayon::ThreadPool>,
}

/// A handle for spawning tasks onto the [`crate::TaskManager`] it was derived from.
///
/// Cheap to clone; every gRPC connection handler can hold its own `TaskSpawner`.
#[derive(Debug, Clone)]
pub struct TaskSpawner {
    pub(crate) inner: Arc<Inner>,
}

impl TaskSpawner {
    /// Spawns a future onto the manager's Tokio runtime. The returned [`TaskHandle`]
    /// resolves to [`TaskResult::Cancelled`] if the manager shuts down before the future
    /// completes, and to [`TaskResult::Completed`] otherwise.
    ///
    /// This is how asynchronous handlers (spec.md §4.3) are dispatched: the execution
    /// core awaits the returned handle directly.
    pub fn spawn<F>(&self, fut: F) -> TaskHandle<F::Output>
    where
        F: std::future::Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let cancelled = self.inner.on_cancel.clone();
        let tracked = self.inner.tracker.track_future(async move {
            tokio::select! {
                _ = cancelled.cancelled() => TaskResult::Cancelled,
                output = fut => TaskResult::Completed(output),
            }
        });
        TaskHandle::new(self.inner.handle.spawn(tracked))
    }

    /// Spawns a CPU-bound blocking task onto the manager's dedicated Rayon pool.
    ///
    /// Synchronous handlers (spec.md §4.3) run here rather than on a Tokio worker
    /// thread, so a slow handler cannot starve the runtime's IO/cooperative scheduling.
    pub fn spawn_blocking<F, R>(&self, func: F) -> crate::manager::BlockingTaskHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        crate::manager::spawn_blocking_on(&self.inner.blocking_pool, func)
    }

    /// Spawns an IO-bound blocking task onto Tokio's own blocking thread pool.
    pub fn spawn_io_blocking<F, R>(&self, func: F) -> crate::manager::BlockingJoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        crate::manager::spawn_io_blocking_on(&self.inner.handle, func)
    }
}
