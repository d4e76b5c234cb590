//! Application layer errors.
//!
//! These errors represent failures while applying a batch, not invalid
//! operations. Invalid operations are `DomainError` from `crate::domain`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::error::{BatchError, ErrorCategory};

/// Errors that occur while committing a batch.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Append requested against a file that does not exist.
    #[error("Attempting to append to file that does not exist: {path}")]
    AppendTargetMissing { path: PathBuf },

    /// The parent directory of a target is missing.
    #[error("Parent directory of {path} does not exist")]
    DirectoryMissing { path: PathBuf },

    /// Any other filesystem operation failed.
    #[error("Failed to {operation} {path}: {reason}")]
    FilesystemError {
        path: PathBuf,
        operation: &'static str,
        reason: String,
    },

    /// The backup location for a target is already taken by another file.
    #[error("Backup location {backup} for {path} is already in use")]
    BackupPathOccupied { path: PathBuf, backup: PathBuf },

    /// A termination signal arrived while the batch was being applied.
    #[error("Interrupted by termination signal")]
    Interrupted,

    /// The termination-signal handler could not be installed.
    #[error("Failed to register termination signal handler: {reason}")]
    SignalRegistration { reason: String },

    /// Store access failed (lock poisoned, etc.).
    #[error("Filesystem state lock poisoned")]
    StoreLockError,

    /// Restoring the original state failed. The filesystem may be left
    /// partially mutated.
    #[error(
        "Revert failed after {cause}; {} path(s) could not be restored",
        .failures.len()
    )]
    RevertFailed {
        cause: Box<BatchError>,
        failures: Vec<RevertFailure>,
    },
}

/// Which revert step failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertStep {
    /// Copying a backup over its original path.
    Restore,
    /// Deleting a file the batch created.
    RemoveCreated,
    /// Deleting a temporary backup.
    RemoveBackup,
}

impl fmt::Display for RevertStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Restore => write!(f, "restore"),
            Self::RemoveCreated => write!(f, "remove created file"),
            Self::RemoveBackup => write!(f, "remove backup"),
        }
    }
}

/// One path revert could not put back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevertFailure {
    pub path: PathBuf,
    pub step: RevertStep,
    pub reason: String,
    /// Backup left on disk holding the original content, if any.
    pub backup: Option<PathBuf>,
}

impl fmt::Display for RevertFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.step,
            self.path.display(),
            self.reason
        )?;
        if let Some(backup) = &self.backup {
            write!(f, " (original content kept at {})", backup.display())?;
        }
        Ok(())
    }
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::AppendTargetMissing { path } => vec![
                format!("File to append to does not exist: {}", path.display()),
                "Create the file first, or queue a write instead of an append".into(),
            ],
            Self::DirectoryMissing { path } => vec![
                format!("Failed to write: {}", path.display()),
                "Ensure the parent directory exists".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Check available disk space".into(),
            ],
            Self::BackupPathOccupied { backup, .. } => vec![
                format!("Another file already exists at {}", backup.display()),
                "It may be left over from an interrupted run; inspect and remove it".into(),
            ],
            Self::Interrupted => vec![
                "The batch was interrupted".into(),
                "All files were restored to their original state".into(),
            ],
            Self::RevertFailed { failures, .. } => {
                let mut out = vec![
                    "Some files could NOT be restored to their original state".into(),
                    "Inspect the following paths by hand:".into(),
                ];
                out.extend(failures.iter().map(|f| format!("  • {f}")));
                out
            }
            _ => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AppendTargetMissing { .. } => ErrorCategory::NotFound,
            Self::DirectoryMissing { .. } => ErrorCategory::NotFound,
            Self::BackupPathOccupied { .. } => ErrorCategory::Validation,
            Self::Interrupted => ErrorCategory::Interrupted,
            Self::RevertFailed { .. } => ErrorCategory::Fatal,
            Self::FilesystemError { .. }
            | Self::SignalRegistration { .. }
            | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}
