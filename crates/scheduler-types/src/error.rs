use std::fmt;

/// The reason a wire `Any` envelope could not be turned into an [`crate::ArgValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// `type_url` is not one of the recognized well-known or scheduler-defined types.
    UnsupportedType,
    /// `type_url` was recognized but `value` failed to deserialize as that type.
    MalformedPayload,
    /// `ListValue`/`MapValue` recursion exceeded the configured depth limit.
    DepthExceeded,
}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DecodeErrorKind::UnsupportedType => "unsupported type",
            DecodeErrorKind::MalformedPayload => "malformed payload",
            DecodeErrorKind::DepthExceeded => "recursion depth exceeded",
        };
        f.write_str(s)
    }
}

/// Error produced by the argument codec when decoding a wire `Any` envelope.
///
/// `Display` renders just the human-readable reason (e.g. `"unsupported type
/// type.googleapis.com/foo.Bar"`) so the execution core can build the exact
/// `"arg-decode: <reason>"` diagnostic spec.md §4.4 calls for without double-prefixing.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{reason}")]
pub struct DecodeError {
    pub type_url: String,
    pub kind: DecodeErrorKind,
    pub reason: String,
}

impl DecodeError {
    pub fn unsupported_type(type_url: impl Into<String>) -> Self {
        let type_url = type_url.into();
        let reason = format!("unsupported type {type_url}");
        Self { type_url, kind: DecodeErrorKind::UnsupportedType, reason }
    }

    pub fn malformed_payload(type_url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { type_url: type_url.into(), kind: DecodeErrorKind::MalformedPayload, reason: reason.into() }
    }

    pub fn depth_exceeded(type_url: impl Into<String>, limit: usize) -> Self {
        let type_url = type_url.into();
        let reason = format!("exceeded max nesting depth of {limit}");
        Self { type_url, kind: DecodeErrorKind::DepthExceeded, reason }
    }
}
