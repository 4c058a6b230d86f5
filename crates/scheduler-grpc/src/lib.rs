//! The RPC surface (spec.md §4.5): exposes `SubmitTask` and `GetResult` over gRPC,
//! translating wire frames to/from the execution core, with optional TLS/mTLS selected
//! at startup from [`ServerConfig`].

mod config;
mod error;
mod server;
mod service;
mod tls;

pub use config::{ServerConfig, TlsMaterial, TransportMode, DEFAULT_ADDR, DEFAULT_PORT};
pub use error::Error;
pub use server::{GrpcServer, GrpcServerHandle};
pub use service::SchedulerService;

/// Protocol buffer generated types, re-exported so callers never need to depend on
/// `scheduler-wire` directly just to build a request.
pub mod proto {
    pub use scheduler_wire::*;
}
