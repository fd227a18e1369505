//! Schema compilation and the type registry.
//!
//! `compiler` adapts the external schema toolchain (`protobuf-parse`, or a
//! `protoc` subprocess) into per-file compile outcomes; `registry` turns the
//! resulting file descriptors into a queryable name-to-type mapping. The
//! registry is the single authority on which message types are known.

pub mod compiler;
pub mod error;
pub mod registry;

pub use compiler::{Backend, CompileOptions, CompiledSet, FileOutcome, SchemaCompiler};
pub use error::SchemaError;
pub use registry::{
    Cardinality, EnumDescriptor, FieldDescriptor, FieldKind, MessageDescriptor, TypeRegistry,
};

#[cfg(test)]
pub(crate) mod testutil {
    use protobuf::descriptor::FileDescriptorProto;
    use protobuf_parse::Parser;
    use std::fs;
    use tempfile::TempDir;

    /// Parse inline proto source through the embedded parser, for tests that
    /// need descriptors without a schema directory on disk.
    pub(crate) fn parse_source(source: &str) -> Vec<FileDescriptorProto> {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("test.proto");
        fs::write(&path, source).expect("write schema");

        let mut parser = Parser::new();
        parser.pure();
        parser.include(dir.path());
        parser.input(&path);
        parser
            .parse_and_typecheck()
            .expect("parse schema")
            .file_descriptors
    }

    /// Build a registry directly from inline proto source.
    pub(crate) fn registry_from_source(source: &str) -> super::TypeRegistry {
        let mut registry = super::TypeRegistry::new();
        for fd in parse_source(source) {
            registry.register_file(&fd);
        }
        registry
    }
}
