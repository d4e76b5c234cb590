//! Batch File Writer - all-or-nothing application of queued file mutations.
//!
//! Operations are queued in memory and only touch the filesystem on
//! [`BatchFileWriter::commit`]:
//! 1. Register a termination-signal guard
//! 2. Apply appends, then writes, backing up every pre-existing target
//!    before its first mutation
//! 3. On success, release the guard and delete the backups
//! 4. On any failure or signal, release the guard and revert
//!
//! Revert copies each backup over its target, deletes files this commit
//! created, then deletes the backups.

use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, SignalRegistry},
        services::{
            backup_naming::{BackupNaming, HashedSiblingNaming},
            cancellation::{CancellationToken, InterruptGuard},
            commit_state::CommitState,
        },
    },
    domain::{
        DomainValidator as validator, Operation, OperationQueue, WriteOptions, normalize_lexically,
    },
    error::{BatchError, BatchResult},
};

/// Outcome of a successful commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// Targets appended to, in application order.
    pub appended: Vec<PathBuf>,
    /// Targets written, in application order.
    pub written: Vec<PathBuf>,
    /// Targets that did not exist before the commit.
    pub created: Vec<PathBuf>,
    /// Number of pre-existing files backed up.
    pub backups_taken: usize,
    /// Backups that could not be deleted after the commit succeeded.
    pub leftover_backups: Vec<PathBuf>,
}

impl CommitReport {
    pub fn operation_count(&self) -> usize {
        self.appended.len() + self.written.len()
    }

    /// `true` when no temporary file was left behind.
    pub fn is_clean(&self) -> bool {
        self.leftover_backups.is_empty()
    }
}

/// Transactional batch file writer.
///
/// Not safe for two concurrent commits touching the same paths, in this
/// process or another: no lock is taken on targets.
pub struct BatchFileWriter {
    filesystem: Box<dyn Filesystem>,
    signals: Box<dyn SignalRegistry>,
    naming: Box<dyn BackupNaming>,
    queue: OperationQueue,
}

impl BatchFileWriter {
    /// Create a writer with the given adapters.
    ///
    /// Backups are named with [`HashedSiblingNaming::for_current_process`].
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use batchwrite_core::application::{BatchFileWriter, ports::*};
    /// use batchwrite_core::domain::WriteOptions;
    ///
    /// let mut writer = BatchFileWriter::new(
    ///     filesystem, // impl Filesystem
    ///     signals,    // impl SignalRegistry
    /// );
    /// writer.queue_append("CHANGELOG.md", "- new entry\n", WriteOptions::default());
    /// writer.queue_write("src/new.rs", "fn main() {}\n", WriteOptions::default());
    /// writer.commit()?;
    /// ```
    pub fn new(filesystem: Box<dyn Filesystem>, signals: Box<dyn SignalRegistry>) -> Self {
        Self {
            filesystem,
            signals,
            naming: Box::new(HashedSiblingNaming::for_current_process()),
            queue: OperationQueue::new(),
        }
    }

    /// Replace the backup naming strategy.
    pub fn with_naming(mut self, naming: Box<dyn BackupNaming>) -> Self {
        self.naming = naming;
        self
    }

    /// Queue a write. No filesystem access happens until [`commit`](Self::commit).
    pub fn queue_write(
        &mut self,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        options: WriteOptions,
    ) {
        self.queue.push_write(path, content, options);
    }

    /// Queue an append. The target must exist when the batch is committed.
    pub fn queue_append(
        &mut self,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        options: WriteOptions,
    ) {
        self.queue.push_append(path, content, options);
    }

    /// Number of queued operations.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued operations in the order a commit would apply them.
    pub fn preview(&self) -> Vec<String> {
        self.queue.iter().map(Operation::to_string).collect()
    }

    /// Apply every queued operation, or none of them.
    ///
    /// The queue is emptied whatever the outcome. On failure the filesystem
    /// has already been restored when the error is returned; a failure
    /// during that restore is returned as [`ApplicationError::RevertFailed`].
    #[instrument(skip_all, fields(pending = self.queue.len()))]
    pub fn commit(&mut self) -> BatchResult<CommitReport> {
        let (appends, writes) = self.queue.drain();

        if appends.is_empty() && writes.is_empty() {
            debug!("Nothing queued, commit is a no-op");
            return Ok(CommitReport::default());
        }

        validator::validate_batch(appends.iter().chain(writes.iter()))?;
        let appends = resolve_all(self.filesystem.as_ref(), appends)?;
        let writes = resolve_all(self.filesystem.as_ref(), writes)?;

        let token = CancellationToken::new();
        let mut guard = InterruptGuard::arm(self.signals.as_ref(), token.clone())?;
        let mut state = CommitState::new();

        let outcome = self.apply(&appends, &writes, &mut state, &token);
        guard.release();
        // A signal that landed after the last checkpoint still aborts the batch.
        let outcome = outcome.and_then(|report| checkpoint(&token).map(|()| report));

        match outcome {
            Ok(mut report) => {
                report.backups_taken = state.backup_count();
                report.leftover_backups = state.discard_backups(self.filesystem.as_ref());
                info!(
                    appended = report.appended.len(),
                    written = report.written.len(),
                    created = report.created.len(),
                    "Batch committed"
                );
                Ok(report)
            }
            Err(cause) => {
                warn!(
                    error = %cause,
                    "Error writing files. Attempting to revert back to original state."
                );
                self.revert(state, cause)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    /// Appends first, then writes, each in queue order.
    fn apply(
        &self,
        appends: &[Operation],
        writes: &[Operation],
        state: &mut CommitState,
        token: &CancellationToken,
    ) -> BatchResult<CommitReport> {
        let fs = self.filesystem.as_ref();
        let mut report = CommitReport::default();

        for op in appends {
            let path = op.path();
            if !fs.exists(path) {
                return Err(ApplicationError::AppendTargetMissing {
                    path: path.to_path_buf(),
                }
                .into());
            }

            self.backup(path, state, token)?;
            fs.append_file(path, op.content(), op.options())?;
            checkpoint(token)?;

            debug!(path = %path.display(), "Appended");
            report.appended.push(path.to_path_buf());
        }

        for op in writes {
            let path = op.path();
            if !state.is_tracked(path) {
                if fs.exists(path) {
                    self.backup(path, state, token)?;
                } else {
                    state.record_created(path);
                    report.created.push(path.to_path_buf());
                }
            }

            fs.write_file(path, op.content(), op.options())?;
            checkpoint(token)?;

            debug!(path = %path.display(), "Written");
            report.written.push(path.to_path_buf());
        }

        Ok(report)
    }

    /// Copy `path` to its backup location unless this commit already did.
    fn backup(
        &self,
        path: &Path,
        state: &mut CommitState,
        token: &CancellationToken,
    ) -> BatchResult<()> {
        if state.has_backup(path) {
            return Ok(());
        }

        let fs = self.filesystem.as_ref();
        let backup = self.naming.backup_path(path);
        if fs.exists(&backup) {
            return Err(ApplicationError::BackupPathOccupied {
                path: path.to_path_buf(),
                backup,
            }
            .into());
        }

        if let Err(e) = fs.copy_file(path, &backup) {
            // A partial copy is not a usable backup.
            if fs.exists(&backup) {
                let _ = fs.remove_file(&backup);
            }
            return Err(e);
        }

        debug!(path = %path.display(), backup = %backup.display(), "Backed up");
        state.record_backup(path, backup);
        checkpoint(token)
    }

    fn revert(&self, state: CommitState, cause: BatchError) -> BatchResult<CommitReport> {
        match state.revert(self.filesystem.as_ref()) {
            Ok(summary) => {
                info!(
                    restored = summary.restored,
                    removed = summary.removed,
                    "Reverted to original state"
                );
                Err(cause)
            }
            Err(failures) => {
                error!(
                    failures = failures.len(),
                    "Revert failed; filesystem may be partially modified"
                );
                Err(ApplicationError::RevertFailed {
                    cause: Box::new(cause),
                    failures,
                }
                .into())
            }
        }
    }
}

/// Stop the batch if a termination signal arrived.
fn checkpoint(token: &CancellationToken) -> BatchResult<()> {
    if token.is_cancelled() {
        warn!("Termination signal received, stopping batch");
        return Err(ApplicationError::Interrupted.into());
    }
    Ok(())
}

/// Absolute, normalised form of a target, so that every spelling of one
/// file is tracked under a single key.
///
/// The parent directory is canonicalised when it exists; otherwise `.` and
/// `..` are collapsed lexically.
fn resolve_target(fs: &dyn Filesystem, path: &Path) -> BatchResult<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        operation: "resolve",
        reason: e.to_string(),
    })?;

    let canonical = absolute
        .file_name()
        .zip(absolute.parent())
        .and_then(|(name, parent)| Some(fs.canonicalize(parent)?.join(name)));

    Ok(canonical.unwrap_or_else(|| normalize_lexically(&absolute)))
}

fn resolve_all(fs: &dyn Filesystem, ops: Vec<Operation>) -> BatchResult<Vec<Operation>> {
    ops.into_iter()
        .map(|op| -> BatchResult<Operation> {
            let resolved = resolve_target(fs, op.path())?;
            Ok(if resolved == op.path() {
                op
            } else {
                op.retarget(resolved)
            })
        })
        .collect()
}
