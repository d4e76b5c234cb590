//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the writer needs from external systems.
//! The `batchwrite-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

use crate::application::services::cancellation::{CancellationToken, RegistrationId};
use crate::domain::WriteOptions;
use crate::error::BatchResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `batchwrite_adapters::filesystem::LocalFilesystem` (production)
/// - `batchwrite_adapters::filesystem::MemoryFilesystem` (testing)
///
/// ## Design Notes
///
/// - Calls are synchronous and not preemptible
/// - A write whose parent directory is missing fails with
///   `ApplicationError::DirectoryMissing`; no directories are created
///   implicitly
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Resolve an existing path to its canonical form, following symlinks
    /// and `..`. `None` if the path does not exist.
    fn canonicalize(&self, path: &Path) -> Option<PathBuf>;

    /// Copy `from` to `to`, replacing `to` if it exists.
    fn copy_file(&self, from: &Path, to: &Path) -> BatchResult<()>;

    /// Write content to a file, replacing any existing content.
    fn write_file(&self, path: &Path, content: &str, options: &WriteOptions) -> BatchResult<()>;

    /// Append content to an existing file.
    fn append_file(&self, path: &Path, content: &str, options: &WriteOptions) -> BatchResult<()>;

    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> BatchResult<()>;

    /// Read a file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> BatchResult<String>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> BatchResult<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> BatchResult<()>;
}

/// Port for process termination signals (SIGINT, SIGTERM, SIGHUP).
///
/// Implemented by:
/// - `batchwrite_adapters::signal::CtrlcSignals` (production)
/// - `batchwrite_adapters::signal::ManualSignals` (testing, embedding)
///
/// A registered token is cancelled when a signal arrives. The registry never
/// runs revert itself: the committing thread observes the token after the
/// filesystem call in flight returns.
#[cfg_attr(test, mockall::automock)]
pub trait SignalRegistry: Send + Sync {
    /// Start forwarding termination signals to `token`.
    fn register(&self, token: CancellationToken) -> BatchResult<RegistrationId>;

    /// Stop forwarding signals for a registration. Unknown ids are ignored.
    fn deregister(&self, id: RegistrationId);
}
