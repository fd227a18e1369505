//! binpb core library for schema-driven protobuf decoding.
//!
//! This crate implements the decode pipeline used by the CLI: the schema
//! compiler adapter turns a `.proto` source tree into file descriptors, the
//! type registry indexes every declared message type by fully-qualified
//! name, and the decode engine matches a raw payload against a named type
//! or brute-forces the registry in registration order. Renderers turn the
//! decoded field tree into text or JSON. All decoding is byte-oriented and
//! side-effect free; file access stays in the compiler adapter and the CLI.
//!
//! Invariants:
//! - `TypeRegistry::list_names()` is stable between registrations, which
//!   makes brute-force order and listing output deterministic.
//! - Duplicate fully-qualified names follow last-registration-wins.
//! - A structural parse succeeds only when every byte of the payload is
//!   consumed with wire types consistent with the target descriptor.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use binpb_core::{CompileOptions, decode_payload, load_schemas};
//!
//! let (registry, _compiled) = load_schemas(Path::new("protos"), CompileOptions::default())?;
//! let payload = std::fs::read("payload.binpb")?;
//! let outcome = decode_payload(&payload, Some("shop.v1.Order"), &registry)?;
//! println!("{outcome:?}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::Path;

mod decode;
mod render;
mod schema;

pub use decode::{DecodeError, MAX_NESTING_DEPTH, WireError, WireType, decode_payload};
pub use render::{OutputFormat, Rendered, UnknownFormat, hex_preview, render};
pub use schema::{
    Backend, Cardinality, CompileOptions, CompiledSet, EnumDescriptor, FieldDescriptor, FieldKind,
    FileOutcome, MessageDescriptor, SchemaCompiler, SchemaError, TypeRegistry,
};

/// Number of payload bytes shown by the heuristic hex-preview fallback.
pub const HEX_PREVIEW_MAX_BYTES: usize = 100;

/// One decoded field, in descriptor declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedField {
    pub name: String,
    pub value: DecodedValue,
}

/// A payload successfully parsed against one message descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    /// Fully-qualified name of the matched type.
    pub type_name: String,
    /// Present fields only, in declaration order.
    pub fields: Vec<DecodedField>,
}

/// Runtime value of a decoded field.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedValue {
    Bool(bool),
    I32(i32),
    I64(i64),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    /// Enum value; `name` is resolved from the registry when known.
    Enum { number: i32, name: Option<String> },
    Message(Box<DecodedMessage>),
    /// Repeated field values in wire order.
    List(Vec<DecodedValue>),
}

/// Terminal result of one decode request.
///
/// Recoverable conditions are outcomes, not errors: an unknown requested
/// name carries the full known-name snapshot, brute-force exhaustion
/// carries every attempted name, and an empty registry degrades to a hex
/// preview.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Matched {
        type_name: String,
        message: DecodedMessage,
    },
    NamedTypeNotFound {
        requested: String,
        known: Vec<String>,
    },
    NoMatch {
        tried: Vec<String>,
    },
    HeuristicFallback {
        preview: String,
    },
}

/// Compile every schema under `root` and build the type registry.
///
/// Per-file compile failures are recorded in the returned [`CompiledSet`]
/// and leave the registry partially populated; only an unusable root (no
/// schema files, unavailable external compiler) is an error.
pub fn load_schemas(
    root: &Path,
    options: CompileOptions,
) -> Result<(TypeRegistry, CompiledSet), SchemaError> {
    let compiler = SchemaCompiler::new(options);
    let compiled = compiler.compile(root)?;
    let mut registry = TypeRegistry::new();
    for outcome in compiled.outcomes() {
        if let FileOutcome::Parsed { descriptors, .. } = outcome {
            for fd in descriptors {
                registry.register_file(fd);
            }
        }
    }
    Ok((registry, compiled))
}
