//! The runtime harness (spec.md §4.6): a single shared Tokio runtime handle plus a
//! dedicated Rayon pool for CPU-bound blocking handlers, tracked for graceful shutdown.

mod manager;
mod spawner;
mod task;

pub use manager::{BlockingJoinHandle, BlockingTaskHandle, BlockingTaskResult, ShutdownFuture, TaskManager, WaitForShutdownFuture};
pub use spawner::TaskSpawner;
pub use task::{TaskHandle, TaskResult};
