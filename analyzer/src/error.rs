//! Error types for the noael-rank pipeline.
//!
//! The pivot and ranking core never fails: missing, conflicting and
//! inconsistent data all degrade to absent values. Errors only come from the
//! collaborators around it:
//!
//! - [`LoadError`] - reading and decoding the record set or an intermediate table
//! - [`SinkError`] - persisting result tables
//! - [`ConfigError`] - environment configuration
//! - [`PipelineError`] - top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Loader Errors
// =============================================================================

/// Errors while loading observation records or an intermediate table.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// Delimiter the CSV reader cannot use.
    #[error("Invalid delimiter '{0}': must be a single ASCII character")]
    InvalidDelimiter(char),

    /// A column the core consumes is not present in the header.
    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    /// A dose cell could not be read as a number.
    #[error("Line {line}, column '{column}' (value '{value}'): not a number")]
    InvalidDose {
        line: u64,
        column: String,
        value: String,
    },

    /// Exported table does not have the expected layout.
    #[error("Malformed intermediate table: {0}")]
    MalformedTable(String),
}

// =============================================================================
// Sink Errors
// =============================================================================

/// Errors while persisting result tables.
#[derive(Debug, Error)]
pub enum SinkError {
    /// IO error.
    #[error("Sink IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error.
    #[error("Sink CSV error: {0}")]
    Csv(#[from] csv::Error),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable holds a value of the wrong shape.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::analyze_csv`]
/// and friends.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Loader error.
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Sink error.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// No records to analyze.
    #[error("No records to analyze")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
