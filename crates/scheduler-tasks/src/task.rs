use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::panic;

use tokio::task::JoinHandle;

/// The outcome of a task spawned onto the [`crate::TaskManager`]: either it ran to
/// completion, or the manager's shutdown signal fired before it finished.
#[derive(Debug)]
pub enum TaskResult<T> {
    Completed(T),
    Cancelled,
}

impl<T> TaskResult<T> {
    pub fn into_completed(self) -> Option<T> {
        match self {
            TaskResult::Completed(value) => Some(value),
            TaskResult::Cancelled => None,
        }
    }
}

/// A handle to a task spawned through [`crate::TaskSpawner`].
///
/// Polling this future propagates the inner task's panic rather than returning it as a
/// value, mirroring `tokio::task::JoinHandle`'s own behavior for panics.
#[must_use = "TaskHandle does nothing unless polled"]
#[derive(Debug)]
pub struct TaskHandle<T> {
    inner: JoinHandle<TaskResult<T>>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(inner: JoinHandle<TaskResult<T>>) -> Self {
        Self { inner }
    }

    /// Aborts the underlying task.
    pub fn abort(&self) {
        self.inner.abort();
    }

    /// Returns true once the task has finished running (either path).
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }
}

impl<T> Future for TaskHandle<T> {
    type Output = TaskResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let inner = unsafe { self.map_unchecked_mut(|s| &mut s.inner) };
        match inner.poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(err)) => panic::resume_unwind(err.into_panic()),
            Poll::Pending => Poll::Pending,
        }
    }
}
