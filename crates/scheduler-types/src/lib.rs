//! Core domain types shared by the codec, cache, registry, and execution core.
//!
//! None of these types know anything about protobuf or tonic; the wire-level
//! conversions live in `scheduler-codec` and `scheduler-wire`.

mod arg_value;
mod error;
mod task;

pub use arg_value::ArgValue;
pub use error::{DecodeError, DecodeErrorKind};
pub use task::{TaskResult, TaskStatus};
