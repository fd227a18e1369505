use thiserror::Error;

use super::wire::WireType;

/// Structural wire-format violation. Any of these rejects the payload for
/// the attempted type, which is what keeps brute-force matching honest.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("wire read failed at offset {offset}: {source}")]
    Read {
        offset: u64,
        #[source]
        source: protobuf::Error,
    },
    #[error("length-delimited region at offset {offset} overruns its container ({length} bytes): {source}")]
    RegionOverrun {
        offset: u64,
        length: u64,
        #[source]
        source: protobuf::Error,
    },
    #[error("invalid field number {number}")]
    InvalidFieldNumber { number: u64 },
    #[error("reserved wire type {bits} for field {number}")]
    ReservedWireType { bits: u32, number: u32 },
    #[error("group encoding is not supported (field {number})")]
    GroupEncoding { number: u32 },
    #[error("unknown field number {number} in message {type_name}")]
    UnknownField { type_name: String, number: u32 },
    #[error("field {field} of {type_name}: expected wire type {expected}, got {got}")]
    WireTypeMismatch {
        type_name: String,
        field: String,
        expected: WireType,
        got: WireType,
    },
    #[error("field {field} of {type_name}: string value is not valid UTF-8")]
    InvalidUtf8 { type_name: String, field: String },
    #[error("required field {field} of {type_name} is missing")]
    MissingRequired { type_name: String, field: String },
    #[error("nested type {0} is not registered")]
    UnknownNestedType(String),
    #[error("message nesting exceeds {0} levels")]
    NestingTooDeep(usize),
}

/// Decode failure for an explicitly requested type. Brute-force attempts
/// never surface this; they consume parse failures internally.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload does not decode as {type_name}: {source}")]
    Malformed {
        type_name: String,
        #[source]
        source: WireError,
    },
}
