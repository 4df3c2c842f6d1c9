use serde::Serialize;

use crate::value::Value;

/// Prefix shared by every well-known wrapper type name.
pub const WRAPPER_PACKAGE: &str = "google.protobuf.";

/// The closed set of scalar field types a loader can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ScalarKind {
    Double,
    Float,
    Int32,
    Int64,
    UInt32,
    UInt64,
    SInt32,
    SInt64,
    Fixed32,
    Fixed64,
    SFixed32,
    SFixed64,
    Bool,
    String,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 14] = [
        ScalarKind::Double,
        ScalarKind::Float,
        ScalarKind::Int32,
        ScalarKind::Int64,
        ScalarKind::UInt32,
        ScalarKind::UInt64,
        ScalarKind::SInt32,
        ScalarKind::SInt64,
        ScalarKind::Fixed32,
        ScalarKind::Fixed64,
        ScalarKind::SFixed32,
        ScalarKind::SFixed64,
        ScalarKind::Bool,
        ScalarKind::String,
    ];

    pub fn from_proto_name(name: &str) -> Option<ScalarKind> {
        ScalarKind::ALL.into_iter().find(|kind| kind.proto_name() == name)
    }

    pub fn proto_name(self) -> &'static str {
        match self {
            ScalarKind::Double   => "double",
            ScalarKind::Float    => "float",
            ScalarKind::Int32    => "int32",
            ScalarKind::Int64    => "int64",
            ScalarKind::UInt32   => "uint32",
            ScalarKind::UInt64   => "uint64",
            ScalarKind::SInt32   => "sint32",
            ScalarKind::SInt64   => "sint64",
            ScalarKind::Fixed32  => "fixed32",
            ScalarKind::Fixed64  => "fixed64",
            ScalarKind::SFixed32 => "sfixed32",
            ScalarKind::SFixed64 => "sfixed64",
            ScalarKind::Bool     => "bool",
            ScalarKind::String   => "string",
        }
    }

    /// The storage class the value is held in, collapsing the wire-encoding
    /// variants (`sint32`, `fixed32`, ...) onto their plain integer kinds.
    pub fn storage(self) -> ScalarKind {
        match self {
            ScalarKind::SInt32 | ScalarKind::SFixed32 => ScalarKind::Int32,
            ScalarKind::SInt64 | ScalarKind::SFixed64 => ScalarKind::Int64,
            ScalarKind::Fixed32                       => ScalarKind::UInt32,
            ScalarKind::Fixed64                       => ScalarKind::UInt64,
            other                                     => other,
        }
    }

    /// Rust type used by prost for this scalar.
    pub fn rust_type(self) -> &'static str {
        match self.storage() {
            ScalarKind::Double => "f64",
            ScalarKind::Float  => "f32",
            ScalarKind::Int32  => "i32",
            ScalarKind::Int64  => "i64",
            ScalarKind::UInt32 => "u32",
            ScalarKind::UInt64 => "u64",
            ScalarKind::Bool   => "bool",
            _                  => "String",
        }
    }

    /// Go type used by protoc-gen-go for this scalar.
    pub fn go_type(self) -> &'static str {
        match self.storage() {
            ScalarKind::Double => "float64",
            ScalarKind::Float  => "float32",
            ScalarKind::Int32  => "int32",
            ScalarKind::Int64  => "int64",
            ScalarKind::UInt32 => "uint32",
            ScalarKind::UInt64 => "uint64",
            ScalarKind::Bool   => "bool",
            _                  => "string",
        }
    }

    /// Whether a Rust copy of this value needs an explicit `.clone()`.
    pub fn is_heap(self) -> bool {
        self == ScalarKind::String
    }
}

/// Zero value of a scalar kind: what an unset, non-optional field holds.
pub fn zero_value(kind: ScalarKind) -> Value {
    match kind.storage() {
        ScalarKind::Double => Value::Double(0.0),
        ScalarKind::Float  => Value::Float(0.0),
        ScalarKind::Int32  => Value::Int32(0),
        ScalarKind::Int64  => Value::Int64(0),
        ScalarKind::UInt32 => Value::UInt32(0),
        ScalarKind::UInt64 => Value::UInt64(0),
        ScalarKind::Bool   => Value::Bool(false),
        _                  => Value::String(String::new()),
    }
}

/// The well-known `google.protobuf.*Value` wrappers a loader can populate.
/// `BytesValue` has no environment encoding and is not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WrapperKind {
    Double,
    Float,
    Int64,
    UInt64,
    Int32,
    UInt32,
    Bool,
    String,
}

impl WrapperKind {
    pub const ALL: [WrapperKind; 8] = [
        WrapperKind::Double,
        WrapperKind::Float,
        WrapperKind::Int64,
        WrapperKind::UInt64,
        WrapperKind::Int32,
        WrapperKind::UInt32,
        WrapperKind::Bool,
        WrapperKind::String,
    ];

    /// Resolves `google.protobuf.Int32Value` (with or without a leading dot).
    pub fn from_type_name(type_name: &str) -> Option<WrapperKind> {
        let bare = type_name.strip_prefix('.').unwrap_or(type_name);
        WrapperKind::ALL
            .into_iter()
            .find(|kind| bare.strip_prefix(WRAPPER_PACKAGE) == Some(kind.message_name()))
    }

    /// Message name inside `google.protobuf`, e.g. `Int32Value`.
    pub fn message_name(self) -> &'static str {
        match self {
            WrapperKind::Double => "DoubleValue",
            WrapperKind::Float  => "FloatValue",
            WrapperKind::Int64  => "Int64Value",
            WrapperKind::UInt64 => "UInt64Value",
            WrapperKind::Int32  => "Int32Value",
            WrapperKind::UInt32 => "UInt32Value",
            WrapperKind::Bool   => "BoolValue",
            WrapperKind::String => "StringValue",
        }
    }

    /// Name without the `Value` suffix, as used by the Go `wrappers` package.
    pub fn short_name(self) -> &'static str {
        let name = self.message_name();
        &name[..name.len() - "Value".len()]
    }

    pub fn scalar(self) -> ScalarKind {
        match self {
            WrapperKind::Double => ScalarKind::Double,
            WrapperKind::Float  => ScalarKind::Float,
            WrapperKind::Int64  => ScalarKind::Int64,
            WrapperKind::UInt64 => ScalarKind::UInt64,
            WrapperKind::Int32  => ScalarKind::Int32,
            WrapperKind::UInt32 => ScalarKind::UInt32,
            WrapperKind::Bool   => ScalarKind::Bool,
            WrapperKind::String => ScalarKind::String,
        }
    }
}
