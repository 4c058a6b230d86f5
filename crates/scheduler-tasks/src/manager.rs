use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::channel::oneshot;
use futures::future::BoxFuture;
use futures::FutureExt;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
pub use tokio_util::sync::WaitForCancellationFuture as WaitForShutdownFuture;
use tokio_util::task::TaskTracker;
use tracing::trace;

use crate::spawner::{Inner, TaskSpawner};

pub type BlockingTaskResult<T> = Result<T, Box<dyn Any + Send>>;

/// A handle to a CPU-bound task running on the manager's Rayon pool.
#[derive(Debug)]
#[must_use = "BlockingTaskHandle does nothing unless polled"]
pub struct BlockingTaskHandle<T>(oneshot::Receiver<BlockingTaskResult<T>>);

impl<T> Future for BlockingTaskHandle<T> {
    type Output = BlockingTaskResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.get_mut().0).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(cancelled)) => {
                let err: Box<dyn Any + Send> = Box::new(cancelled);
                Poll::Ready(Err(err))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// A handle to an IO-bound task running on Tokio's own blocking pool.
#[derive(Debug)]
#[must_use = "BlockingJoinHandle does nothing unless polled"]
pub struct BlockingJoinHandle<T>(JoinHandle<T>);

impl<T> Future for BlockingJoinHandle<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let inner = unsafe { self.map_unchecked_mut(|s| &mut s.0) };
        match inner.poll(cx) {
            Poll::Ready(Ok(res)) => Poll::Ready(res),
            Poll::Ready(Err(err)) => panic::resume_unwind(err.into_panic()),
            Poll::Pending => Poll::Pending,
        }
    }
}

pub(crate) fn spawn_blocking_on<F, R>(pool: &Arc<ThreadPool>, func: F) -> BlockingTaskHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    let pool = Arc::clone(pool);
    pool.spawn(move || {
        let _ = tx.send(panic::catch_unwind(AssertUnwindSafe(func)));
    });
    BlockingTaskHandle(rx)
}

pub(crate) fn spawn_io_blocking_on<F, R>(handle: &Handle, func: F) -> BlockingJoinHandle<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    BlockingJoinHandle(handle.spawn_blocking(func))
}

/// The runtime harness (spec.md §4.6): owns the shared Tokio runtime handle, tracks
/// in-flight work for graceful shutdown, and dedicates a separate Rayon pool to
/// CPU-bound blocking handlers so they never starve Tokio's own worker threads.
///
/// Cloning a `TaskManager` shares the same underlying runtime and tracker; there is
/// exactly one logical manager per server process.
#[derive(Debug, Clone)]
pub struct TaskManager {
    inner: Arc<Inner>,
}

impl TaskManager {
    /// Builds a manager around the given Tokio runtime handle.
    pub fn new(handle: Handle) -> Self {
        let blocking_pool = ThreadPoolBuilder::new()
            .thread_name(|i| format!("scheduler-blocking-{i}"))
            .build()
            .expect("failed to build blocking task thread pool");

        Self {
            inner: Arc::new(Inner {
                handle,
                tracker: TaskTracker::new(),
                on_cancel: CancellationToken::new(),
                blocking_pool: Arc::new(blocking_pool),
            }),
        }
    }

    /// Builds a manager around the ambient Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside the context of a Tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }

    /// Returns a [`TaskSpawner`] for spawning work onto this manager.
    pub fn task_spawner(&self) -> TaskSpawner {
        TaskSpawner { inner: Arc::clone(&self.inner) }
    }

    /// Shortcut for [`TaskSpawner::spawn_blocking`].
    pub fn spawn_blocking<F, R>(&self, func: F) -> BlockingTaskHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.task_spawner().spawn_blocking(func)
    }

    /// Shortcut for [`TaskSpawner::spawn_io_blocking`].
    pub fn spawn_io_blocking<F, R>(&self, func: F) -> BlockingJoinHandle<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.task_spawner().spawn_io_blocking(func)
    }

    /// Resolves once [`TaskManager::shutdown`] has been called.
    pub fn wait_for_shutdown(&self) -> WaitForShutdownFuture<'_> {
        self.inner.on_cancel.cancelled()
    }

    /// Signals shutdown and waits, up to no particular timeout of its own, for all
    /// tracked in-flight tasks to observe the cancellation and finish. Callers that need
    /// a bounded grace period should race this future against a timer (see
    /// `scheduler-grpc`'s server shutdown sequence).
    pub fn shutdown(&self) -> ShutdownFuture<'_> {
        let fut = Box::pin(async {
            if !self.inner.on_cancel.is_cancelled() {
                self.inner.on_cancel.cancel();
            }

            self.wait_for_shutdown().await;

            let _ = self.inner.tracker.close();
            self.inner.tracker.wait().await;
        });

        ShutdownFuture { fut }
    }

    /// The Tokio runtime handle this manager spawns work onto.
    pub fn handle(&self) -> &Handle {
        &self.inner.handle
    }

    /// Number of tasks currently tracked (spawned via [`TaskSpawner::spawn`] and not yet
    /// finished). For diagnostics only.
    pub fn in_flight(&self) -> usize {
        self.inner.tracker.len()
    }
}

impl Drop for TaskManager {
    fn drop(&mut self) {
        trace!(target: "scheduler::tasks", "task manager dropped, cancelling in-flight work");
        self.inner.on_cancel.cancel();
    }
}

/// A future that resolves when the [`TaskManager`] has finished shutting down.
#[must_use = "futures do nothing unless polled"]
pub struct ShutdownFuture<'a> {
    fut: BoxFuture<'a, ()>,
}

impl Future for ShutdownFuture<'_> {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.get_mut().fut.poll_unpin(cx)
    }
}

impl core::fmt::Debug for ShutdownFuture<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShutdownFuture").field("fut", &"...").finish()
    }
}

#[cfg(test)]
mod tests {
    use futures::future;
    use tokio::time::{self, Duration};

    use super::*;
    use crate::task::TaskResult;

    #[tokio::test]
    async fn spawned_tasks_are_tracked_until_completion() {
        let manager = TaskManager::current();
        let spawner = manager.task_spawner();

        let a = spawner.spawn(time::sleep(Duration::from_millis(5)));
        let b = spawner.spawn(time::sleep(Duration::from_millis(5)));

        assert_eq!(manager.in_flight(), 2);

        a.await;
        b.await;
    }

    #[tokio::test]
    async fn shutdown_cancels_in_flight_tasks() {
        let manager = TaskManager::current();
        let spawner = manager.task_spawner();

        let handle = spawner.spawn(future::pending::<()>());
        manager.shutdown().await;

        match handle.await {
            TaskResult::Cancelled => {}
            TaskResult::Completed(()) => panic!("expected the task to be cancelled"),
        }
    }

    #[tokio::test]
    async fn completed_tasks_report_their_output() {
        let manager = TaskManager::current();
        let handle = manager.task_spawner().spawn(async { 42 });
        assert!(matches!(handle.await, TaskResult::Completed(42)));
    }

    #[tokio::test]
    async fn cpu_blocking_tasks_run_on_the_rayon_pool() {
        let manager = TaskManager::current();
        let res = manager.spawn_blocking(|| 1 + 1).await.unwrap();
        assert_eq!(res, 2);
    }

    #[tokio::test]
    async fn cpu_blocking_panics_propagate() {
        let manager = TaskManager::current();
        let result = manager.spawn_blocking(|| -> i32 { panic!("boom") }).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn io_blocking_tasks_run_to_completion() {
        let manager = TaskManager::current();
        let handle = manager.spawn_io_blocking(|| 41 + 1);
        assert_eq!(handle.await, 42);
    }
}
