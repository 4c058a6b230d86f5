//! Small process-level helpers shared by the server binary.

use tokio::signal::ctrl_c;

/// Resolves when `SIGTERM` (Unix only) or `SIGINT` is received. Used to trigger the
/// runtime harness's graceful shutdown sequence (spec.md §4.6).
pub async fn wait_shutdown_signals() {
    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c() => {},
        _ = sigterm() => {},
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c().await;
    }
}

#[cfg(unix)]
async fn sigterm() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    signal(SignalKind::terminate())?.recv().await;
    Ok(())
}
