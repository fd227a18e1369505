//! Descriptor compiler adapter.
//!
//! Discovers `.proto` files under a schema root and turns each one into
//! `FileDescriptorProto`s via `protobuf-parse`. Per-file failures are
//! recorded without aborting the batch; the batch fails only when the root
//! contains no schema files at all, or when the external `protoc` backend
//! is requested but the binary is unavailable.
//!
//! Successfully parsed files are also materialized as serialized
//! `FileDescriptorSet` artifacts in a scratch directory. The scratch
//! directory is deleted when the `CompiledSet` is dropped unless
//! `keep_artifacts` is set; deletion is best-effort.

use std::path::{Path, PathBuf};
use std::process::Command;

use protobuf::Message;
use protobuf::descriptor::{FileDescriptorProto, FileDescriptorSet};
use protobuf_parse::Parser;
use tempfile::TempDir;

use super::error::SchemaError;

/// Schema parser backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// Embedded pure-Rust parser (`protobuf-parse`).
    #[default]
    Pure,
    /// External `protoc` binary, resolved from PATH.
    Protoc,
}

/// Options for one compile batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileOptions {
    pub backend: Backend,
    /// Persist the scratch descriptor directory after the run.
    pub keep_artifacts: bool,
}

/// Result of compiling a single schema file.
#[derive(Debug)]
pub enum FileOutcome {
    Parsed {
        path: PathBuf,
        /// Descriptors for the file and its resolved imports.
        descriptors: Vec<FileDescriptorProto>,
    },
    Failed {
        path: PathBuf,
        message: String,
    },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            FileOutcome::Parsed { path, .. } | FileOutcome::Failed { path, .. } => path,
        }
    }
}

#[derive(Debug)]
enum ScratchDir {
    Temp(TempDir),
    Kept(PathBuf),
}

impl ScratchDir {
    fn path(&self) -> &Path {
        match self {
            ScratchDir::Temp(dir) => dir.path(),
            ScratchDir::Kept(path) => path,
        }
    }
}

/// Per-file compile results plus the scratch artifact directory.
#[derive(Debug)]
pub struct CompiledSet {
    outcomes: Vec<FileOutcome>,
    scratch: ScratchDir,
}

impl CompiledSet {
    pub fn outcomes(&self) -> &[FileOutcome] {
        &self.outcomes
    }

    pub fn file_count(&self) -> usize {
        self.outcomes.len()
    }

    pub fn parsed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, FileOutcome::Parsed { .. }))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.file_count() - self.parsed_count()
    }

    /// Location of the serialized descriptor artifacts. Valid until the set
    /// is dropped, or indefinitely when compiled with `keep_artifacts`.
    pub fn artifact_dir(&self) -> &Path {
        self.scratch.path()
    }

    pub fn artifacts_kept(&self) -> bool {
        matches!(self.scratch, ScratchDir::Kept(_))
    }
}

/// Adapter that turns a schema source tree into compiled descriptors.
pub struct SchemaCompiler {
    options: CompileOptions,
}

impl SchemaCompiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Compile every `.proto` file found recursively under `root`.
    pub fn compile(&self, root: &Path) -> Result<CompiledSet, SchemaError> {
        if self.options.backend == Backend::Protoc {
            ensure_protoc_available()?;
        }

        let files = discover_proto_files(root)?;
        if files.is_empty() {
            return Err(SchemaError::NoSchemaFilesFound {
                root: root.to_path_buf(),
            });
        }

        let scratch = tempfile::Builder::new()
            .prefix("binpb-compiled-")
            .tempdir()
            .map_err(|source| SchemaError::Io {
                path: std::env::temp_dir(),
                source,
            })?;

        let mut outcomes = Vec::with_capacity(files.len());
        for path in files {
            match self.parse_one(root, &path) {
                Ok(descriptors) => {
                    write_artifact(scratch.path(), root, &path, &descriptors);
                    outcomes.push(FileOutcome::Parsed { path, descriptors });
                }
                Err(message) => outcomes.push(FileOutcome::Failed { path, message }),
            }
        }

        let scratch = if self.options.keep_artifacts {
            ScratchDir::Kept(scratch.keep())
        } else {
            ScratchDir::Temp(scratch)
        };
        Ok(CompiledSet { outcomes, scratch })
    }

    fn parse_one(&self, root: &Path, path: &Path) -> Result<Vec<FileDescriptorProto>, String> {
        let mut parser = Parser::new();
        match self.options.backend {
            Backend::Pure => parser.pure(),
            Backend::Protoc => parser.protoc(),
        };
        parser.include(root);
        parser.input(path);
        parser
            .parse_and_typecheck()
            .map(|parsed| parsed.file_descriptors)
            .map_err(|err| err.to_string())
    }
}

fn ensure_protoc_available() -> Result<(), SchemaError> {
    let status = Command::new("protoc").arg("--version").output();
    match status {
        Ok(output) if output.status.success() => Ok(()),
        _ => Err(SchemaError::CompilerUnavailable),
    }
}

fn discover_proto_files(root: &Path) -> Result<Vec<PathBuf>, SchemaError> {
    let pattern = root.join("**").join("*.proto");
    let pattern = pattern.to_string_lossy();
    let paths = glob::glob(&pattern).map_err(|err| SchemaError::Scan {
        root: root.to_path_buf(),
        message: err.msg.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| SchemaError::Scan {
            root: root.to_path_buf(),
            message: err.to_string(),
        })?;
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Serialize the parsed descriptors as one `FileDescriptorSet` artifact per
/// input file. Artifact write failures are not fatal to the batch.
fn write_artifact(
    scratch: &Path,
    root: &Path,
    input: &Path,
    descriptors: &[FileDescriptorProto],
) {
    let mut set = FileDescriptorSet::new();
    set.file = descriptors.to_vec();
    let Ok(bytes) = set.write_to_bytes() else {
        return;
    };
    let _ = std::fs::write(scratch.join(artifact_name(root, input)), bytes);
}

fn artifact_name(root: &Path, input: &Path) -> String {
    let relative = input.strip_prefix(root).unwrap_or(input);
    let flattened = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("__");
    format!("{}.binpb", flattened.trim_end_matches(".proto"))
}
