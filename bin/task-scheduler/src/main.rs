//! The task-scheduler server binary: parses CLI flags into a [`scheduler_grpc::ServerConfig`],
//! wires up the registry, cache, and execution core, and serves `SubmitTask`/`GetResult`
//! until a shutdown signal arrives (spec.md §4.6, SPEC_FULL.md §6 CLI surface).

mod cli;

use std::process::ExitCode;

use anyhow::Context;
use scheduler_cache::ResultCache;
use scheduler_core::{builtins, ExecutionCore};
use scheduler_registry::Registry;
use scheduler_tasks::TaskManager;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let args = Args::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = args.into_server_config();

    let task_manager = TaskManager::current();

    let mut builder = Registry::builder();
    builtins::register_builtins(&mut builder, task_manager.task_spawner())
        .context("built-in handler registration")?;
    let registry = builder.build();

    let cache = ResultCache::new(config.cache_capacity, config.cache_shards);
    let core = ExecutionCore::new(registry, cache, task_manager.task_spawner());

    let addr = config.addr;
    let handle = scheduler_grpc::GrpcServer::new(config)
        .start(core, task_manager)
        .await
        .context("starting gRPC server")?;

    info!(target: "scheduler", %addr, "task scheduler listening");

    scheduler_utils::wait_shutdown_signals().await;
    info!(target: "scheduler", "shutdown signal received, draining in-flight requests");

    handle.graceful_shutdown().await;
    info!(target: "scheduler", "shutdown complete");

    Ok(())
}
