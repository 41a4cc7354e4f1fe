//! Error types for schema compilation, fixture loading and JSON conversion

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for encoder operations
pub type Result<T> = std::result::Result<T, EncodeError>;

/// Failures while compiling a `.proto` file or resolving a message inside it
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Proto file not found: {}", .0.display())]
    MissingProtoFile(PathBuf),

    #[error("Proto root not found: {}", .0.display())]
    MissingRoot(PathBuf),

    #[error("Proto file {} is not inside proto root {}", .file.display(), .root.display())]
    OutsideRoot { file: PathBuf, root: PathBuf },

    #[error("Failed to compile {}: {message}", .file.display())]
    Compile { file: PathBuf, message: String },

    #[error(
        "Message type '{name}' not found in {}; available: [{}]",
        .file.display(),
        .available.join(", ")
    )]
    UnknownMessage {
        name: String,
        file: PathBuf,
        available: Vec<String>,
    },

    #[error(
        "Message type '{name}' is ambiguous in {}; candidates: [{}]",
        .file.display(),
        .candidates.join(", ")
    )]
    AmbiguousMessage {
        name: String,
        file: PathBuf,
        candidates: Vec<String>,
    },
}

/// Failures while reading the JSON fixture from disk
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in fixture {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures while mapping between JSON values and dynamic messages
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("JSON does not match message '{message}': {source}")]
    Mismatch {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to decode '{message}' from wire format: {source}")]
    Decode {
        message: String,
        #[source]
        source: prost::DecodeError,
    },

    #[error("Failed to render '{message}' as JSON: {source}")]
    Render {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Any failure of the schema -> fixture -> message pipeline
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Fixture error: {0}")]
    Fixture(#[from] FixtureError),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),
}

impl EncodeError {
    /// Short label for the failing stage, used in logs
    pub fn stage(&self) -> &'static str {
        match self {
            EncodeError::Schema(_) => "schema",
            EncodeError::Fixture(_) => "fixture",
            EncodeError::Conversion(_) => "conversion",
        }
    }
}
