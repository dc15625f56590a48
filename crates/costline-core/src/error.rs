//! Error types for costline
//!
//! The bucketing and deviation functions are total and never fail. Errors
//! only arise at the edges: reading event pages from disk, decoding JSON,
//! and interpreting command-line arguments.
//!
//! # Example
//!
//! ```
//! use costline_core::error::{CostlineError, Result};
//!
//! fn example_function() -> Result<()> {
//!     // This will automatically convert io::Error to CostlineError
//!     let _file = std::fs::read_to_string("nonexistent.json")?;
//!     Ok(())
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for costline operations
#[derive(Error, Debug)]
pub enum CostlineError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// No event data directory found
    #[error("No event data directory found")]
    NoDataDirectory,

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Invalid timezone
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Parse error with file context
    #[error("Parse error in {file}: {error}")]
    Parse {
        /// The file that caused the error
        file: PathBuf,
        /// The error message
        error: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in costline
///
/// ```
/// use costline_core::Result;
///
/// fn process_data() -> Result<String> {
///     Ok("Processed successfully".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, CostlineError>;
