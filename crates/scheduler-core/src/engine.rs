//! The six-step `submit` pipeline (spec.md §4.4) and the pure-read `get_result`
//! operation.

use prost_types::Any;
use scheduler_cache::ResultCache;
use scheduler_registry::{Handler, HandlerKind, Registry};
use scheduler_tasks::TaskSpawner;
use scheduler_types::{TaskResult, TaskStatus};
use scheduler_wire::{ResultResponse, Status as WireStatus, TaskResponse};
use tracing::{debug, instrument, warn};

/// Owns the registry and cache for the life of the process and runs every submission
/// through the dependency-check / dispatch / cache-write pipeline.
///
/// Cheap to clone: every field is itself a cheap-to-clone handle (`Registry` and
/// `ResultCache` are `Arc`-backed, `TaskSpawner` wraps an `Arc`), so each gRPC connection
/// can hold its own `ExecutionCore` without any contention beyond the cache's own
/// per-shard locks.
#[derive(Debug, Clone)]
pub struct ExecutionCore {
    registry: Registry,
    cache: ResultCache,
    spawner: TaskSpawner,
}

impl ExecutionCore {
    pub fn new(registry: Registry, cache: ResultCache, spawner: TaskSpawner) -> Self {
        Self { registry, cache, spawner }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Runs the full submission pipeline: decode args, validate deps, look up and
    /// dispatch the handler, cache the outcome, respond. Every step's failure is
    /// terminal and produces a `FAILED` response without advancing further.
    #[instrument(skip(self, args), fields(task_id = %task_id, method = %method))]
    pub async fn submit(
        &self,
        task_id: String,
        method: String,
        args: Vec<Any>,
        deps: Vec<String>,
        is_async: bool,
    ) -> TaskResponse {
        let result = self.run_submit(&task_id, &method, args, deps, is_async).await;
        let status = wire_status(result.status);
        TaskResponse { task_id, status: status as i32, result: result.value }
    }

    async fn run_submit(
        &self,
        task_id: &str,
        method: &str,
        args: Vec<Any>,
        deps: Vec<String>,
        is_async: bool,
    ) -> TaskResult {
        // Step 1: argument decode.
        let args = match scheduler_codec::decode_args(&args) {
            Ok(args) => args,
            Err(err) => {
                warn!(target: "scheduler::core", step = "decode", %err, "arg decode failed");
                return TaskResult::failed(format!("arg-decode: {err}"));
            }
        };
        debug!(target: "scheduler::core", step = "decode", "args decoded");

        // Step 2: dependency check. Duplicate ids collapse to a set; order among the
        // caller's wire-level `deps` doesn't matter for the check, but we report the
        // first missing one in the original order so the diagnostic is deterministic.
        if let Some(missing) = deps.iter().find(|dep| !self.cache.contains_all(std::iter::once(*dep))) {
            warn!(target: "scheduler::core", step = "deps", dep = %missing, "missing dependency");
            return TaskResult::failed(format!("missing dep: {missing}"));
        }
        debug!(target: "scheduler::core", step = "deps", "dependencies satisfied");

        // Step 3: handler lookup + kind match.
        let handler = match self.registry.lookup(method) {
            Some(handler) => handler,
            None => {
                warn!(target: "scheduler::core", step = "lookup", "method not found");
                return TaskResult::failed("method not found");
            }
        };
        let kind_matches = matches!(
            (handler.kind(), is_async),
            (HandlerKind::Sync, false) | (HandlerKind::Async, true)
        );
        if !kind_matches {
            warn!(target: "scheduler::core", step = "lookup", "method kind mismatch");
            return TaskResult::failed("method kind mismatch");
        }
        debug!(target: "scheduler::core", step = "lookup", kind = ?handler.kind(), "handler found");

        // Step 4: execute.
        let result = match self.dispatch(handler, args).await {
            Ok(value) => TaskResult::success(value),
            Err(diagnostic) => {
                warn!(target: "scheduler::core", step = "execute", %diagnostic, "handler error");
                TaskResult::failed(diagnostic)
            }
        };
        debug!(target: "scheduler::core", step = "execute", "handler completed");

        // Step 5: cache before responding.
        self.cache.put(task_id.to_string(), result.clone());
        debug!(target: "scheduler::core", step = "cache", "result cached");

        result
    }

    /// Runs the handler and converts any runtime-surfaced error (a panicking sync
    /// handler, or an async handler whose future was cancelled by shutdown) into the
    /// `Err` side. A handler's own string return, success or conventional failure
    /// marker alike, is always `Ok`: the registry never interprets it (spec.md §4.3).
    async fn dispatch(
        &self,
        handler: &Handler,
        args: Vec<scheduler_types::ArgValue>,
    ) -> Result<String, String> {
        match handler {
            Handler::Sync(f) => {
                let f = f.clone();
                self.spawner
                    .spawn_blocking(move || f(args))
                    .await
                    .map_err(|panic| format!("internal: handler panicked: {}", panic_message(&panic)))
            }
            Handler::Async(f) => {
                let fut = f(args);
                match self.spawner.spawn(fut).await {
                    scheduler_tasks::TaskResult::Completed(value) => Ok(value),
                    scheduler_tasks::TaskResult::Cancelled => {
                        Err("internal: task cancelled during shutdown".to_string())
                    }
                }
            }
        }
    }

    /// Pure cache read. Never writes, never touches the registry.
    #[instrument(skip(self), fields(task_id = %task_id))]
    pub fn get_result(&self, task_id: &str) -> ResultResponse {
        match self.cache.get(task_id) {
            Some(result) => {
                ResultResponse { status: wire_status(result.status) as i32, result: result.value }
            }
            None => ResultResponse { status: WireStatus::Pending as i32, result: String::new() },
        }
    }
}

fn wire_status(status: TaskStatus) -> WireStatus {
    match status {
        TaskStatus::Success => WireStatus::Success,
        TaskStatus::Failed => WireStatus::Failed,
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
