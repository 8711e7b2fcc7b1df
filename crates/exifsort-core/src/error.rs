//! Error types for the exifsort pipeline.
//!
//! Errors are split by concern: configuration problems stop a run before any
//! stage starts, pipeline errors are fatal to a run in progress, and metadata
//! errors never leave the classifier (they only mean "not a dated image").

use std::path::PathBuf;
use thiserror::Error;

use crate::types::Stage;

/// Top-level error type for exifsort operations.
#[derive(Error, Debug)]
pub enum SortError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fatal pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// No source directory was given
    #[error("Source directory is not specified")]
    MissingSource,

    /// No destination directory was given
    #[error("Destination directory is not specified")]
    MissingDestination,

    /// Source path exists but is not a directory
    #[error("Source is not a directory: {0}")]
    SourceNotDirectory(PathBuf),

    /// A layout path could not be inspected
    #[error("Cannot access {path}: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal errors raised by a pipeline stage.
///
/// Any of these ends the run. Files already moved stay where they are.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Directory traversal failed
    #[error("Walk failed under {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// A scanned file could not be opened
    #[error("Cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Destination directory could not be created
    #[error("Cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rename into the destination tree failed
    #[error("Cannot move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Destination file already exists and the conflict policy forbids overwriting
    #[error("Destination already exists: {to} (moving {from})")]
    DestinationExists { from: PathBuf, to: PathBuf },

    /// The downstream stage went away before this stage finished sending
    #[error("{stage} stopped: downstream stage is gone")]
    Disconnected { stage: Stage },

    /// A stage task panicked or was cancelled
    #[error("Stage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Reasons a file is not treated as a dated image.
///
/// The classifier skips the file on any of these; they are never fatal.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// The container or tag block could not be decoded
    #[error("Cannot decode metadata: {0}")]
    Decode(String),

    /// No capture timestamp tag present
    #[error("No capture timestamp")]
    MissingTimestamp,

    /// Timestamp tag present but not a valid date/time
    #[error("Invalid capture timestamp: {0}")]
    InvalidTimestamp(String),
}

impl From<exif::Error> for MetadataError {
    fn from(err: exif::Error) -> Self {
        MetadataError::Decode(err.to_string())
    }
}

/// Convenience type alias for exifsort results.
pub type Result<T> = std::result::Result<T, SortError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
