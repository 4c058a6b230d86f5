/// The closed sum of argument types the scheduler understands.
///
/// Integer and float variants preserve the wire-declared width: decoding an
/// `Int64Value` always yields [`ArgValue::Int64`], never silently narrowed or
/// promoted to another variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Int32(i32),
    Int64(i64),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    /// Ordered sequence of values. May nest to any depth.
    List(Vec<ArgValue>),
    /// String-keyed mapping. Preserves wire insertion order; callers must not rely on
    /// that order for correctness.
    Map(Vec<(String, ArgValue)>),
}

impl ArgValue {
    /// A short name for the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ArgValue::Int32(_) => "Int32",
            ArgValue::Int64(_) => "Int64",
            ArgValue::UInt32(_) => "UInt32",
            ArgValue::UInt64(_) => "UInt64",
            ArgValue::Float32(_) => "Float32",
            ArgValue::Float64(_) => "Float64",
            ArgValue::Bool(_) => "Bool",
            ArgValue::String(_) => "String",
            ArgValue::Bytes(_) => "Bytes",
            ArgValue::List(_) => "List",
            ArgValue::Map(_) => "Map",
        }
    }
}
