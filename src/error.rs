//! Error handling for acqproc-rs
//!
//! This module defines the crate-level error type and a Result alias. The
//! processing pipeline and the sweep engine carry their own narrower error
//! enums which convert into [`AcqProcError`] with `?`.

use crate::pipeline::PipelineError;
use crate::sweep::SweepError;
use thiserror::Error;

/// Main error type for acqproc-rs operations
#[derive(Error, Debug)]
pub enum AcqProcError {
    /// A pipeline or node was misconfigured for the packet it received
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// A sweep ordering was requested for an impossible axis or shape
    #[error("Sweep error: {0}")]
    Sweep(#[from] SweepError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AcqProcError>,
    },
}

impl AcqProcError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AcqProcError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

impl From<serde_json::Error> for AcqProcError {
    fn from(err: serde_json::Error) -> Self {
        AcqProcError::Serialization(err.to_string())
    }
}

/// Result type alias for acqproc-rs operations
pub type Result<T> = std::result::Result<T, AcqProcError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AcqProcError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
