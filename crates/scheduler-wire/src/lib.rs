//! Generated wire types and gRPC service stubs for the task scheduler.
//!
//! This crate is intentionally code-free beyond the `prost`/`tonic` generated module: it
//! exists so that both the argument codec and the gRPC server/client can depend on the
//! same `TaskRequest` / `TaskResponse` / `ListValue` / `MapValue` types without the codec
//! pulling in the server's transport dependencies.

#![allow(clippy::large_enum_variant)]

tonic::include_proto!("scheduler");

/// The encoded `FileDescriptorSet` for the scheduler proto, used to register the
/// reflection service (grpcurl, Postman, etc.) alongside the two RPC services.
pub const FILE_DESCRIPTOR_SET: &[u8] =
    include_bytes!(concat!(env!("OUT_DIR"), "/scheduler_descriptor.bin"));

/// Re-exported so callers never need to depend on `prost-types` directly just to build
/// or inspect an `Any` envelope.
pub mod any {
    pub use prost_types::Any;
}
