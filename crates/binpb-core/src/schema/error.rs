use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("protoc not found in PATH")]
    CompilerUnavailable,
    #[error("no .proto files found under {}", root.display())]
    NoSchemaFilesFound { root: PathBuf },
    #[error("failed to scan schema directory {}: {message}", root.display())]
    Scan { root: PathBuf, message: String },
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
