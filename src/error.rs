//! Error types for rs-scrapy.
//!
//! This module defines the errors returned by sources, the query engine and
//! the scraping pipeline, plus the record kept for every failed parser.

use serde::Serialize;

/// Default status-like code for pipeline and selection failures.
pub const DEFAULT_CODE: u16 = 400;

/// Error type for scraping operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source could not be read (missing file, HTTP client or server error).
    #[error("Source '{locator}' could not be read: {reason}")]
    SourceUnavailable {
        /// Path or URL identifying the source.
        locator: String,
        /// Human readable cause.
        reason: String,
        /// Status-like code (HTTP status, 404 for a missing file, ...).
        code: u16,
    },

    /// The validity checker rejected the fetched HTML.
    #[error("Page html validation failed.")]
    ValidationFailed,

    /// A required selection matched nothing.
    #[error("Selection does not exist.")]
    SelectionNotFound,

    /// A parser gave up while processing the document.
    #[error("{message}")]
    StepFailed {
        /// Message describing the failure.
        message: String,
        /// Status-like code.
        code: u16,
    },
}

impl Error {
    /// Creates a parser failure with the default code.
    pub fn step(message: impl Into<String>) -> Self {
        Self::StepFailed {
            message: message.into(),
            code: DEFAULT_CODE,
        }
    }

    /// Returns the status-like code carried by this error.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::SourceUnavailable { code, .. } | Self::StepFailed { code, .. } => *code,
            Self::ValidationFailed | Self::SelectionNotFound => DEFAULT_CODE,
        }
    }
}

/// Result type alias for scraping operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single parser, recorded while the pipeline keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepError {
    /// Name of the failing parser.
    pub step: String,
    /// Error message.
    pub message: String,
    /// Status-like code.
    pub code: u16,
}

impl StepError {
    pub(crate) fn new(step: &str, error: &Error) -> Self {
        Self {
            step: step.to_string(),
            message: error.to_string(),
            code: error.code(),
        }
    }
}
