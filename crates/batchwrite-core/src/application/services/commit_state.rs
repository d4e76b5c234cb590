//! Bookkeeping for a single commit: backups taken and files created.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use crate::application::error::{RevertFailure, RevertStep};
use crate::application::ports::Filesystem;

/// What one commit has done so far.
///
/// Invariants:
/// - a path has at most one backup
/// - a path is in `created` only if it has no backup
#[derive(Debug, Default)]
pub(crate) struct CommitState {
    /// target → temporary copy of its pre-commit content
    backups: BTreeMap<PathBuf, PathBuf>,
    /// targets that did not exist before this commit
    created: BTreeSet<PathBuf>,
}

/// Counts from a revert that completed without failures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct RevertSummary {
    pub restored: usize,
    pub removed: usize,
}

impl CommitState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` once the path has a backup or was created by this commit.
    pub fn is_tracked(&self, path: &Path) -> bool {
        self.backups.contains_key(path) || self.created.contains(path)
    }

    pub fn has_backup(&self, path: &Path) -> bool {
        self.backups.contains_key(path)
    }

    pub fn record_backup(&mut self, target: &Path, backup: PathBuf) {
        debug_assert!(!self.created.contains(target));
        self.backups.entry(target.to_path_buf()).or_insert(backup);
    }

    pub fn record_created(&mut self, target: &Path) {
        debug_assert!(!self.backups.contains_key(target));
        self.created.insert(target.to_path_buf());
    }

    pub fn backup_count(&self) -> usize {
        self.backups.len()
    }

    /// Delete every temporary backup after a successful commit.
    ///
    /// Returns the backups that could not be deleted.
    pub fn discard_backups(self, fs: &dyn Filesystem) -> Vec<PathBuf> {
        let mut leftover = Vec::new();
        for (target, backup) in self.backups {
            if let Err(e) = fs.remove_file(&backup) {
                warn!(
                    error = %e,
                    target = %target.display(),
                    backup = %backup.display(),
                    "Failed to remove backup"
                );
                leftover.push(backup);
            }
        }
        leftover
    }

    /// Put every touched path back to its pre-commit state.
    ///
    /// Restores backups over their targets, deletes files this commit
    /// created, then deletes the backups. Keeps going past individual
    /// failures; a backup whose restore failed is left on disk.
    ///
    /// Consumes the state: a commit can revert at most once.
    pub fn revert(self, fs: &dyn Filesystem) -> Result<RevertSummary, Vec<RevertFailure>> {
        let mut failures = Vec::new();
        let mut summary = RevertSummary::default();
        let mut disposable = Vec::with_capacity(self.backups.len());

        for (target, backup) in self.backups {
            match fs.copy_file(&backup, &target) {
                Ok(()) => {
                    debug!(path = %target.display(), "Restored from backup");
                    summary.restored += 1;
                    disposable.push((target, backup));
                }
                Err(e) => {
                    error!(
                        error = %e,
                        path = %target.display(),
                        backup = %backup.display(),
                        "Failed to restore file from backup"
                    );
                    failures.push(RevertFailure {
                        path: target,
                        step: RevertStep::Restore,
                        reason: e.to_string(),
                        backup: fs.exists(&backup).then_some(backup),
                    });
                }
            }
        }

        for created in self.created {
            // A write that failed before creating the file leaves nothing to undo.
            if !fs.exists(&created) {
                continue;
            }
            match fs.remove_file(&created) {
                Ok(()) => {
                    debug!(path = %created.display(), "Removed created file");
                    summary.removed += 1;
                }
                Err(e) => {
                    error!(error = %e, path = %created.display(), "Failed to remove created file");
                    failures.push(RevertFailure {
                        path: created,
                        step: RevertStep::RemoveCreated,
                        reason: e.to_string(),
                        backup: None,
                    });
                }
            }
        }

        for (target, backup) in disposable {
            if let Err(e) = fs.remove_file(&backup) {
                error!(error = %e, backup = %backup.display(), "Failed to remove backup");
                failures.push(RevertFailure {
                    path: target,
                    step: RevertStep::RemoveBackup,
                    reason: e.to_string(),
                    backup: Some(backup),
                });
            }
        }

        if failures.is_empty() {
            Ok(summary)
        } else {
            Err(failures)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ApplicationError;
    use crate::application::ports::MockFilesystem;

    fn io_failure(path: &Path) -> crate::error::BatchError {
        ApplicationError::FilesystemError {
            path: path.to_path_buf(),
            operation: "copy",
            reason: "no such file".into(),
        }
        .into()
    }

    #[test]
    fn tracking_covers_backups_and_created() {
        let mut state = CommitState::new();
        state.record_backup(Path::new("/a"), PathBuf::from("/a.bak"));
        state.record_created(Path::new("/b"));

        assert!(state.is_tracked(Path::new("/a")));
        assert!(state.is_tracked(Path::new("/b")));
        assert!(!state.is_tracked(Path::new("/c")));
        assert!(state.has_backup(Path::new("/a")));
        assert!(!state.has_backup(Path::new("/b")));
    }

    #[test]
    fn first_backup_wins() {
        let mut state = CommitState::new();
        state.record_backup(Path::new("/a"), PathBuf::from("/first.bak"));
        state.record_backup(Path::new("/a"), PathBuf::from("/second.bak"));
        assert_eq!(state.backup_count(), 1);
        assert_eq!(
            state.backups.get(Path::new("/a")),
            Some(&PathBuf::from("/first.bak"))
        );
    }

    #[test]
    fn revert_restores_then_removes() {
        let mut fs = MockFilesystem::new();
        fs.expect_copy_file()
            .withf(|from, to| from == Path::new("/a.bak") && to == Path::new("/a"))
            .times(1)
            .returning(|_, _| Ok(()));
        fs.expect_exists()
            .withf(|p| p == Path::new("/new"))
            .return_const(true);
        fs.expect_remove_file()
            .withf(|p| p == Path::new("/new"))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_remove_file()
            .withf(|p| p == Path::new("/a.bak"))
            .times(1)
            .returning(|_| Ok(()));

        let mut state = CommitState::new();
        state.record_backup(Path::new("/a"), PathBuf::from("/a.bak"));
        state.record_created(Path::new("/new"));

        let summary = state.revert(&fs).unwrap();
        assert_eq!(
            summary,
            RevertSummary {
                restored: 1,
                removed: 1
            }
        );
    }

    #[test]
    fn created_file_that_never_appeared_is_skipped() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().return_const(false);
        fs.expect_remove_file().never();

        let mut state = CommitState::new();
        state.record_created(Path::new("/never-written"));

        assert_eq!(state.revert(&fs).unwrap(), RevertSummary::default());
    }

    #[test]
    fn failed_restore_keeps_backup_and_is_reported() {
        let mut fs = MockFilesystem::new();
        fs.expect_copy_file().returning(|_, to| Err(io_failure(to)));
        fs.expect_exists()
            .withf(|p| p == Path::new("/a.bak"))
            .return_const(true);
        fs.expect_remove_file().never();

        let mut state = CommitState::new();
        state.record_backup(Path::new("/a"), PathBuf::from("/a.bak"));

        let failures = state.revert(&fs).unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].step, RevertStep::Restore);
        assert_eq!(failures[0].backup, Some(PathBuf::from("/a.bak")));
    }

    #[test]
    fn discard_reports_leftover_backups() {
        let mut fs = MockFilesystem::new();
        fs.expect_remove_file().returning(|p| Err(io_failure(p)));

        let mut state = CommitState::new();
        state.record_backup(Path::new("/a"), PathBuf::from("/a.bak"));

        assert_eq!(state.discard_backups(&fs), vec![PathBuf::from("/a.bak")]);
    }
}
