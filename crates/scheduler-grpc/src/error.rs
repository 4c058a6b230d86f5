//! Error type for building and running the gRPC server (SPEC_FULL.md §7: all internal
//! error types implement `std::error::Error` via `thiserror`).

/// Errors that can occur while assembling or running the gRPC server. Distinct from the
/// wire-visible `TaskResponse` status -- these are startup/transport faults, not task
/// outcomes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport error from tonic (bind failure, TLS handshake setup, etc.).
    #[error(transparent)]
    Transport(#[from] tonic::transport::Error),

    /// Reflection service failed to build from the embedded file descriptor set.
    #[error("failed to build reflection service: {0}")]
    ReflectionBuild(String),

    /// Reading or parsing PEM-encoded TLS material failed.
    #[error("failed to load TLS material from {path}: {reason}")]
    TlsMaterial { path: String, reason: String },

    /// The server handle was asked to stop twice.
    #[error("gRPC server has already been stopped")]
    AlreadyStopped,
}
