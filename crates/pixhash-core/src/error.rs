//! Error types for the pixhash conversion pipeline.
//!
//! Errors are organized by stage so each message names the file (and, for
//! moves, both ends of the rename) that caused it.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for pixhash operations.
#[derive(Error, Debug)]
pub enum PixhashError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
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
}

/// Pipeline errors, one variant per stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The file could not be opened or decoded as an image
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// The file could not be read while sniffing its signature
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No known signature matched the file's leading bytes
    #[error("Unknown file type: {path}")]
    UnknownType { path: PathBuf },

    /// Renaming the file into the output directory failed
    #[error("Failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The tagging program is not on the search path
    #[error("{program} not found in $PATH (while tagging {path})")]
    ToolNotFound { program: String, path: PathBuf },

    /// The tagging program exists but could not be run
    #[error("Failed to run {program} on {path}: {source}")]
    Tagger {
        program: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Whether the run may continue with the next file after this error.
    ///
    /// Only a missing tagging program is recoverable; everything else
    /// aborts the remaining batch.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, PipelineError::ToolNotFound { .. })
    }
}

/// Convenience type alias for pixhash results.
pub type Result<T> = std::result::Result<T, PixhashError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
