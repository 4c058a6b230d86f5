//! Translates wire `Any` envelopes to [`ArgValue`]s and back.
//!
//! Decoding is the hot path: it runs on every `SubmitTask` call. Encoding exists for
//! server-internal diagnostics and for round-trip testing; the submit path never needs
//! it since handlers return plain strings.

use prost::Message;
use prost_types::{
    Any, BoolValue, BytesValue, DoubleValue, FloatValue, Int32Value, Int64Value, StringValue,
    UInt32Value, UInt64Value,
};
use scheduler_types::{ArgValue, DecodeError};
use scheduler_wire::{map_value, ListValue, MapValue};

/// Suggested recursion bound for `ListValue`/`MapValue` nesting (spec.md §4.1).
pub const MAX_DEPTH: usize = 64;

const TYPE_URL_PREFIX: &str = "type.googleapis.com/";

/// Decodes an ordered sequence of wire `Any` envelopes into [`ArgValue`]s.
///
/// Fails fast on the first envelope that cannot be decoded; partial results are not
/// returned since a `TaskRequest` with any bad argument fails step 1 wholesale.
pub fn decode_args(args: &[Any]) -> Result<Vec<ArgValue>, DecodeError> {
    args.iter().map(|any| decode_any(any, 0)).collect()
}

/// Encodes a single [`ArgValue`] back into its wire `Any` envelope.
pub fn encode_arg(value: &ArgValue) -> Any {
    match value {
        ArgValue::Int32(v) => wrap("google.protobuf.Int32Value", Int32Value { value: *v }),
        ArgValue::Int64(v) => wrap("google.protobuf.Int64Value", Int64Value { value: *v }),
        ArgValue::UInt32(v) => wrap("google.protobuf.UInt32Value", UInt32Value { value: *v }),
        ArgValue::UInt64(v) => wrap("google.protobuf.UInt64Value", UInt64Value { value: *v }),
        ArgValue::Float32(v) => wrap("google.protobuf.FloatValue", FloatValue { value: *v }),
        ArgValue::Float64(v) => wrap("google.protobuf.DoubleValue", DoubleValue { value: *v }),
        ArgValue::Bool(v) => wrap("google.protobuf.BoolValue", BoolValue { value: *v }),
        ArgValue::String(v) => wrap("google.protobuf.StringValue", StringValue { value: v.clone() }),
        ArgValue::Bytes(v) => wrap("google.protobuf.BytesValue", BytesValue { value: v.clone() }),
        ArgValue::List(items) => {
            let values = items.iter().map(encode_arg).collect();
            wrap("scheduler.ListValue", ListValue { values })
        }
        ArgValue::Map(entries) => {
            let entries = entries
                .iter()
                .map(|(key, value)| map_value::Entry { key: key.clone(), value: Some(encode_arg(value)) })
                .collect();
            wrap("scheduler.MapValue", MapValue { entries })
        }
    }
}

/// Encodes an ordered sequence of [`ArgValue`]s into wire `Any` envelopes.
pub fn encode_args(values: &[ArgValue]) -> Vec<Any> {
    values.iter().map(encode_arg).collect()
}

fn wrap<M: Message>(suffix: &str, message: M) -> Any {
    Any { type_url: format!("{TYPE_URL_PREFIX}{suffix}"), value: message.encode_to_vec() }
}

fn decode_any(any: &Any, depth: usize) -> Result<ArgValue, DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::depth_exceeded(any.type_url.clone(), MAX_DEPTH));
    }

    let suffix = any.type_url.strip_prefix(TYPE_URL_PREFIX).unwrap_or(any.type_url.as_str());

    match suffix {
        "google.protobuf.Int32Value" => decode_wrapper::<Int32Value>(any, |w| ArgValue::Int32(w.value)),
        "google.protobuf.Int64Value" => decode_wrapper::<Int64Value>(any, |w| ArgValue::Int64(w.value)),
        "google.protobuf.UInt32Value" => decode_wrapper::<UInt32Value>(any, |w| ArgValue::UInt32(w.value)),
        "google.protobuf.UInt64Value" => decode_wrapper::<UInt64Value>(any, |w| ArgValue::UInt64(w.value)),
        "google.protobuf.FloatValue" => decode_wrapper::<FloatValue>(any, |w| ArgValue::Float32(w.value)),
        "google.protobuf.DoubleValue" => decode_wrapper::<DoubleValue>(any, |w| ArgValue::Float64(w.value)),
        "google.protobuf.BoolValue" => decode_wrapper::<BoolValue>(any, |w| ArgValue::Bool(w.value)),
        "google.protobuf.StringValue" => decode_wrapper::<StringValue>(any, |w| ArgValue::String(w.value)),
        "google.protobuf.BytesValue" => decode_wrapper::<BytesValue>(any, |w| ArgValue::Bytes(w.value)),
        "scheduler.ListValue" => {
            let list = ListValue::decode(any.value.as_slice())
                .map_err(|e| DecodeError::malformed_payload(any.type_url.clone(), e.to_string()))?;
            let items = list.values.iter().map(|v| decode_any(v, depth + 1)).collect::<Result<_, _>>()?;
            Ok(ArgValue::List(items))
        }
        "scheduler.MapValue" => {
            let map = MapValue::decode(any.value.as_slice())
                .map_err(|e| DecodeError::malformed_payload(any.type_url.clone(), e.to_string()))?;
            let entries = map
                .entries
                .into_iter()
                .map(|entry| {
                    let value = entry.value.ok_or_else(|| {
                        DecodeError::malformed_payload(
                            any.type_url.clone(),
                            format!("missing value for key `{}`", entry.key),
                        )
                    })?;
                    Ok((entry.key, decode_any(&value, depth + 1)?))
                })
                .collect::<Result<_, DecodeError>>()?;
            Ok(ArgValue::Map(entries))
        }
        _ => Err(DecodeError::unsupported_type(any.type_url.clone())),
    }
}

fn decode_wrapper<T>(any: &Any, project: impl FnOnce(T) -> ArgValue) -> Result<ArgValue, DecodeError>
where
    T: Message + Default,
{
    let wrapper = T::decode(any.value.as_slice())
        .map_err(|e| DecodeError::malformed_payload(any.type_url.clone(), e.to_string()))?;
    Ok(project(wrapper))
}
