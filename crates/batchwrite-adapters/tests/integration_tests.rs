//! Integration tests: `BatchFileWriter` driven through the real adapters.

use std::path::{Path, PathBuf};

use batchwrite_adapters::{
    LocalFilesystem, ManualSignals, MemoryFilesystem,
    filesystem::{FaultOp, FsCall},
};
use batchwrite_core::{
    application::{
        ApplicationError, BackupNaming, HashedSiblingNaming, RegistrationId, RevertStep,
    },
    prelude::*,
};
use tempfile::TempDir;

const RUN_ID: &str = "test-run";

fn memory_writer(fs: &MemoryFilesystem, signals: &ManualSignals) -> BatchFileWriter {
    BatchFileWriter::new(Box::new(fs.clone()), Box::new(signals.clone()))
        .with_naming(Box::new(HashedSiblingNaming::new(RUN_ID)))
}

fn local_writer() -> BatchFileWriter {
    BatchFileWriter::new(Box::new(LocalFilesystem::new()), Box::new(ManualSignals::new()))
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn restores(calls: &[FsCall], target: &Path) -> usize {
    calls
        .iter()
        .filter(|c| matches!(c, FsCall::Copy { to, .. } if to == target))
        .count()
}

// ============================================================================
// On-disk behaviour
// ============================================================================

#[test]
fn write_creates_new_file_without_leftovers() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("a.txt");

    let mut writer = local_writer();
    writer.queue_write(&target, "hello", WriteOptions::default());
    let report = writer.commit().unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello");
    assert_eq!(report.created, vec![target.canonicalize().unwrap()]);
    assert!(report.is_clean());
    assert_eq!(dir_entries(tmp.path()), vec!["a.txt"]);
}

#[test]
fn failed_write_restores_existing_file() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("a.txt");
    std::fs::write(&target, "old").unwrap();

    let mut writer = local_writer();
    writer.queue_write(&target, "new", WriteOptions::default());
    writer.queue_write(
        tmp.path().join("no/such/dir/b.txt"),
        "b",
        WriteOptions::default(),
    );
    let err = writer.commit().unwrap_err();

    assert!(matches!(
        err,
        BatchError::Application(ApplicationError::DirectoryMissing { .. })
    ));
    assert!(!err.is_fatal());
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "old");
    assert_eq!(dir_entries(tmp.path()), vec!["a.txt"]);
}

#[test]
fn append_to_missing_file_creates_nothing() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("missing.txt");

    let mut writer = local_writer();
    writer.queue_append(&target, "x", WriteOptions::default());
    let err = writer.commit().unwrap_err();

    assert!(matches!(
        err,
        BatchError::Application(ApplicationError::AppendTargetMissing { .. })
    ));
    assert!(
        err.to_string()
            .starts_with("Attempting to append to file that does not exist")
    );
    assert!(!target.exists());
    assert!(dir_entries(tmp.path()).is_empty());
}

#[test]
fn append_extends_existing_file() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("log.txt");
    std::fs::write(&target, "A").unwrap();

    let mut writer = local_writer();
    writer.queue_append(&target, "B", WriteOptions::default());
    let report = writer.commit().unwrap();

    assert_eq!(std::fs::read_to_string(&target).unwrap(), "AB");
    assert_eq!(report.backups_taken, 1);
    assert!(report.created.is_empty());
    assert_eq!(dir_entries(tmp.path()), vec!["log.txt"]);
}

#[test]
fn failed_batch_removes_created_files_and_backups() {
    let tmp = TempDir::new().unwrap();
    let log = tmp.path().join("log.txt");
    std::fs::write(&log, "A").unwrap();

    let mut writer = local_writer();
    writer.queue_append(&log, "B", WriteOptions::default());
    writer.queue_write(tmp.path().join("new.txt"), "n", WriteOptions::default());
    writer.queue_write(tmp.path().join("gone/c.txt"), "c", WriteOptions::default());
    assert!(writer.commit().is_err());

    assert_eq!(std::fs::read_to_string(&log).unwrap(), "A");
    assert_eq!(dir_entries(tmp.path()), vec!["log.txt"]);
}

#[test]
fn relative_targets_resolve_against_working_directory() {
    let tmp = TempDir::new().unwrap();
    let target = tmp.path().join("rel.txt");
    let relative = relative_to_cwd(&target);

    let mut writer = local_writer();
    writer.queue_write(&relative, "x", WriteOptions::default());
    let report = writer.commit().unwrap();

    assert!(report.written[0].is_absolute());
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "x");
}

#[test]
fn aliased_spellings_share_one_backup() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir(tmp.path().join("x")).unwrap();
    let target = tmp.path().join("a.txt");
    std::fs::write(&target, "old").unwrap();

    let mut writer = local_writer();
    writer.queue_write(&target, "mid", WriteOptions::default());
    writer.queue_write(tmp.path().join("x/../a.txt"), "new", WriteOptions::default());
    writer.queue_write(tmp.path().join("no/such/b.txt"), "b", WriteOptions::default());
    let err = writer.commit().unwrap_err();

    assert!(matches!(
        err,
        BatchError::Application(ApplicationError::DirectoryMissing { .. })
    ));
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "old");
    assert_eq!(dir_entries(tmp.path()), vec!["a.txt", "x"]);
}

#[test]
fn aliased_spellings_report_one_target() {
    let fs = MemoryFilesystem::new().with_file("/proj/a.txt", "0").with_dir("/proj/x");
    let signals = ManualSignals::new();

    let mut writer = memory_writer(&fs, &signals);
    writer.queue_write("/proj/a.txt", "1", WriteOptions::default());
    writer.queue_write("/proj/x/../a.txt", "2", WriteOptions::default());
    let report = writer.commit().unwrap();

    assert_eq!(report.backups_taken, 1);
    assert_eq!(
        report.written,
        vec![PathBuf::from("/proj/a.txt"), PathBuf::from("/proj/a.txt")]
    );
    assert_eq!(fs.read_file(Path::new("/proj/a.txt")).as_deref(), Some("2"));
}

/// `target` expressed relative to the current directory, via `..` hops.
fn relative_to_cwd(target: &Path) -> PathBuf {
    let cwd = std::env::current_dir().unwrap();
    let depth = cwd.components().count() - 1;
    let mut relative = PathBuf::new();
    for _ in 0..depth {
        relative.push("..");
    }
    relative.join(target.strip_prefix("/").unwrap())
}

// ============================================================================
// Termination signals
// ============================================================================

#[test]
fn signal_during_write_reverts_everything() {
    let fs = MemoryFilesystem::new().with_file("/proj/a.txt", "old");
    let signals = ManualSignals::new();
    let trigger = signals.clone();
    fs.on_write("/proj/a.txt", move |_| {
        trigger.raise();
    });

    let mut writer = memory_writer(&fs, &signals);
    writer.queue_write("/proj/a.txt", "new", WriteOptions::default());
    writer.queue_write("/proj/b.txt", "b", WriteOptions::default());
    let err = writer.commit().unwrap_err();

    assert!(err.is_interrupted());
    assert_eq!(fs.read_file(Path::new("/proj/a.txt")).as_deref(), Some("old"));
    assert_eq!(fs.list_files(), vec![PathBuf::from("/proj/a.txt")]);
    assert_eq!(signals.registered(), 0);
}

#[test]
fn revert_runs_exactly_once() {
    let fs = MemoryFilesystem::new().with_file("/proj/a.txt", "old");
    let signals = ManualSignals::new();
    let trigger = signals.clone();
    fs.on_write("/proj/a.txt", move |_| {
        trigger.raise();
        trigger.raise();
    });

    let mut writer = memory_writer(&fs, &signals);
    writer.queue_write("/proj/a.txt", "new", WriteOptions::default());
    writer.queue_write("/proj/b.txt", "b", WriteOptions::default());
    assert!(writer.commit().is_err());

    let target = Path::new("/proj/a.txt");
    assert_eq!(restores(&fs.calls(), target), 1);
    assert_eq!(fs.read_file(target).as_deref(), Some("old"));
}

/// Raises a signal while the commit is deregistering, after the last
/// filesystem call has returned.
struct LateSignals(ManualSignals);

impl SignalRegistry for LateSignals {
    fn register(&self, token: CancellationToken) -> BatchResult<RegistrationId> {
        self.0.register(token)
    }

    fn deregister(&self, id: RegistrationId) {
        self.0.raise();
        self.0.deregister(id);
    }
}

#[test]
fn signal_after_last_write_still_reverts() {
    let fs = MemoryFilesystem::new().with_file("/proj/a.txt", "old");
    let signals = ManualSignals::new();

    let mut writer = BatchFileWriter::new(
        Box::new(fs.clone()),
        Box::new(LateSignals(signals.clone())),
    )
    .with_naming(Box::new(HashedSiblingNaming::new(RUN_ID)));
    writer.queue_write("/proj/a.txt", "new", WriteOptions::default());
    writer.queue_write("/proj/b.txt", "b", WriteOptions::default());
    let err = writer.commit().unwrap_err();

    assert!(err.is_interrupted());
    assert_eq!(fs.read_file(Path::new("/proj/a.txt")).as_deref(), Some("old"));
    assert_eq!(fs.list_files(), vec![PathBuf::from("/proj/a.txt")]);
    assert_eq!(signals.registered(), 0);
}

#[test]
fn signal_outside_commit_reaches_nobody() {
    let fs = MemoryFilesystem::new().with_dir("/proj");
    let signals = ManualSignals::new();

    let mut writer = memory_writer(&fs, &signals);
    writer.queue_write("/proj/a.txt", "a", WriteOptions::default());
    writer.commit().unwrap();

    assert_eq!(signals.raise(), 0);
    assert_eq!(fs.read_file(Path::new("/proj/a.txt")).as_deref(), Some("a"));
}

// ============================================================================
// Ordering and bookkeeping
// ============================================================================

#[test]
fn appends_apply_before_writes() {
    let fs = MemoryFilesystem::new().with_file("/proj/log.txt", "A");
    let signals = ManualSignals::new();

    let mut writer = memory_writer(&fs, &signals);
    writer.queue_write("/proj/log.txt", "X", WriteOptions::default());
    writer.queue_append("/proj/log.txt", "B", WriteOptions::default());
    let report = writer.commit().unwrap();

    assert_eq!(fs.read_file(Path::new("/proj/log.txt")).as_deref(), Some("X"));
    assert_eq!(report.backups_taken, 1);

    let mutations: Vec<_> = fs
        .calls()
        .into_iter()
        .filter(|c| matches!(c, FsCall::Append(_) | FsCall::Write(_)))
        .collect();
    assert_eq!(
        mutations,
        vec![
            FsCall::Append(PathBuf::from("/proj/log.txt")),
            FsCall::Write(PathBuf::from("/proj/log.txt")),
        ]
    );
}

#[test]
fn last_write_to_a_path_wins() {
    let fs = MemoryFilesystem::new().with_file("/proj/a.txt", "0");
    let signals = ManualSignals::new();

    let mut writer = memory_writer(&fs, &signals);
    writer.queue_write("/proj/a.txt", "1", WriteOptions::default());
    writer.queue_write("/proj/a.txt", "2", WriteOptions::default());
    let report = writer.commit().unwrap();

    assert_eq!(fs.read_file(Path::new("/proj/a.txt")).as_deref(), Some("2"));
    assert_eq!(report.written.len(), 2);
    assert_eq!(report.backups_taken, 1);
    assert_eq!(fs.list_files(), vec![PathBuf::from("/proj/a.txt")]);
}

#[test]
fn append_then_write_restores_pre_commit_content() {
    let fs = MemoryFilesystem::new().with_file("/proj/log.txt", "A");
    let signals = ManualSignals::new();
    fs.fail_on("/proj/other.txt", FaultOp::Write);

    let mut writer = memory_writer(&fs, &signals);
    writer.queue_append("/proj/log.txt", "B", WriteOptions::default());
    writer.queue_write("/proj/log.txt", "C", WriteOptions::default());
    writer.queue_write("/proj/other.txt", "o", WriteOptions::default());
    assert!(writer.commit().is_err());

    assert_eq!(fs.read_file(Path::new("/proj/log.txt")).as_deref(), Some("A"));
    assert_eq!(fs.list_files(), vec![PathBuf::from("/proj/log.txt")]);
}

#[test]
fn new_file_mode_is_passed_through() {
    let fs = MemoryFilesystem::new().with_dir("/proj");
    let signals = ManualSignals::new();

    let mut writer = memory_writer(&fs, &signals);
    writer.queue_write(
        "/proj/run.sh",
        "#!/bin/sh\n",
        WriteOptions::new().with_mode(0o755),
    );
    writer.commit().unwrap();

    assert_eq!(fs.mode(Path::new("/proj/run.sh")), Some(0o755));
}

#[test]
fn writer_is_reusable_after_failure() {
    let fs = MemoryFilesystem::new().with_dir("/proj");
    let signals = ManualSignals::new();

    let mut writer = memory_writer(&fs, &signals);
    writer.queue_append("/proj/missing.txt", "x", WriteOptions::default());
    assert!(writer.commit().is_err());
    assert!(writer.is_empty());

    writer.queue_write("/proj/a.txt", "a", WriteOptions::default());
    writer.commit().unwrap();
    assert_eq!(fs.list_files(), vec![PathBuf::from("/proj/a.txt")]);
}

// ============================================================================
// Backup edge cases
// ============================================================================

#[test]
fn occupied_backup_path_aborts_untouched() {
    let backup = HashedSiblingNaming::new(RUN_ID).backup_path(Path::new("/proj/a.txt"));
    let fs = MemoryFilesystem::new()
        .with_file("/proj/a.txt", "old")
        .with_file(&backup, "someone else's");
    let signals = ManualSignals::new();

    let mut writer = memory_writer(&fs, &signals);
    writer.queue_write("/proj/a.txt", "new", WriteOptions::default());
    let err = writer.commit().unwrap_err();

    assert!(matches!(
        err,
        BatchError::Application(ApplicationError::BackupPathOccupied { .. })
    ));
    assert_eq!(fs.read_file(Path::new("/proj/a.txt")).as_deref(), Some("old"));
    assert_eq!(fs.read_file(&backup).as_deref(), Some("someone else's"));
}

#[test]
fn failed_backup_copy_aborts_untouched() {
    let fs = MemoryFilesystem::new().with_file("/proj/a.txt", "old");
    let signals = ManualSignals::new();
    fs.fail_on("/proj/a.txt", FaultOp::Copy);

    let mut writer = memory_writer(&fs, &signals);
    writer.queue_write("/proj/a.txt", "new", WriteOptions::default());
    assert!(writer.commit().is_err());

    assert_eq!(fs.list_files(), vec![PathBuf::from("/proj/a.txt")]);
    assert_eq!(fs.read_file(Path::new("/proj/a.txt")).as_deref(), Some("old"));
}

#[test]
fn vanished_backup_is_a_fatal_revert_failure() {
    let target = Path::new("/proj/a.txt");
    let backup = HashedSiblingNaming::new(RUN_ID).backup_path(target);
    let fs = MemoryFilesystem::new().with_file(target, "old");
    let signals = ManualSignals::new();
    fs.fail_on("/proj/b.txt", FaultOp::Write);

    let saboteur = fs.clone();
    let doomed = backup.clone();
    fs.on_write(target, move |_| {
        saboteur.remove_file(&doomed).unwrap();
    });

    let mut writer = memory_writer(&fs, &signals);
    writer.queue_write(target, "new", WriteOptions::default());
    writer.queue_write("/proj/b.txt", "b", WriteOptions::default());
    let err = writer.commit().unwrap_err();

    assert!(err.is_fatal());
    match err {
        BatchError::Application(ApplicationError::RevertFailed { cause, failures }) => {
            assert!(cause.to_string().contains("injected fault"));
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].path, target);
            assert_eq!(failures[0].step, RevertStep::Restore);
            assert_eq!(failures[0].backup, None);
        }
        other => panic!("expected RevertFailed, got {other:?}"),
    }
    assert_eq!(fs.read_file(target).as_deref(), Some("new"));
}
