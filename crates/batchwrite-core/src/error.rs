//! Unified error handling for batchwrite core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for batchwrite core operations.
#[derive(Debug, Error, Clone)]
pub enum BatchError {
    /// Errors from the domain layer (invalid operations).
    #[error("Invalid operation: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (commit failures).
    #[error("{0}")]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl BatchError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec!["This appears to be a bug in batchwrite".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
            },
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// `true` when the filesystem may have been left partially mutated.
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Fatal
    }

    /// `true` when a termination signal stopped the batch.
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Application(ApplicationError::Interrupted))
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Interrupted,
    Internal,
    /// Revert itself failed.
    Fatal,
}

/// Convenient result type alias.
pub type BatchResult<T> = Result<T, BatchError>;
