// ============================================================================
// domain/error.rs - OPERATION VALIDATION ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// Raised while validating queued operations, before the commit touches
/// the filesystem.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Operation has an empty target path")]
    EmptyPath,

    #[error("Invalid permission mode {mode:#o} for {path}: must be within 0o7777")]
    InvalidMode { path: String, mode: u32 },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::EmptyPath => vec![
                "Every queued operation needs a target path".into(),
                "Check the manifest for entries with an empty `path`".into(),
            ],
            Self::InvalidMode { mode, .. } => vec![
                format!("Mode {:#o} has bits outside the permission range", mode),
                "Use an octal value such as 0o644 or 0o755".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyPath | Self::InvalidMode { .. } => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
}
