//! In-memory filesystem adapter for testing.
//!
//! Besides plain storage it can inject faults on chosen paths and run a hook
//! while a write is in flight, which is how tests reproduce a failure or a
//! termination signal in the middle of a batch.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use batchwrite_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::{WriteOptions, normalize_lexically},
    error::BatchResult,
};

/// Filesystem call kinds that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultOp {
    Copy,
    Write,
    Append,
    Remove,
}

/// A mutating call recorded by [`MemoryFilesystem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FsCall {
    Copy { from: PathBuf, to: PathBuf },
    Write(PathBuf),
    Append(PathBuf),
    Remove(PathBuf),
}

type WriteHook = Arc<dyn Fn(&Path) + Send + Sync>;

/// In-memory filesystem for testing.
#[derive(Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Default)]
struct MemoryFilesystemInner {
    files: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
    modes: HashMap<PathBuf, u32>,
    faults: HashSet<(PathBuf, FaultOp)>,
    write_hooks: HashMap<PathBuf, WriteHook>,
    calls: Vec<FsCall>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Seed a file, creating its parent directories (testing helper).
    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        let path = path.as_ref();
        {
            let mut inner = self.inner.write().unwrap();
            if let Some(parent) = path.parent() {
                inner.add_dir_all(parent);
            }
            inner.files.insert(path.to_path_buf(), content.to_string());
        }
        self
    }

    /// Seed a directory and its parents (testing helper).
    pub fn with_dir(self, path: impl AsRef<Path>) -> Self {
        self.inner.write().unwrap().add_dir_all(path.as_ref());
        self
    }

    /// Make every `op` call touching `path` fail.
    pub fn fail_on(&self, path: impl Into<PathBuf>, op: FaultOp) {
        let mut inner = self.inner.write().unwrap();
        inner.faults.insert((path.into(), op));
    }

    /// Run `hook` after `path` has been written but before the write returns.
    pub fn on_write(&self, path: impl Into<PathBuf>, hook: impl Fn(&Path) + Send + Sync + 'static) {
        let mut inner = self.inner.write().unwrap();
        inner.write_hooks.insert(path.into(), Arc::new(hook));
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).cloned()
    }

    /// Permission mode recorded when a write created the file.
    pub fn mode(&self, path: &Path) -> Option<u32> {
        let inner = self.inner.read().ok()?;
        inner.modes.get(path).copied()
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        let inner = self.inner.read().unwrap();
        let mut files: Vec<_> = inner.files.keys().cloned().collect();
        files.sort();
        files
    }

    /// Mutating calls in the order they were made.
    pub fn calls(&self) -> Vec<FsCall> {
        self.inner.read().unwrap().calls.clone()
    }

    /// Clear all contents, faults and hooks.
    pub fn clear(&self) {
        let mut inner = self.inner.write().unwrap();
        *inner = MemoryFilesystemInner::default();
    }

    fn write_guard(
        &self,
    ) -> BatchResult<std::sync::RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError.into())
    }
}

impl MemoryFilesystemInner {
    fn add_dir_all(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }

    fn parent_exists(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => self.directories.contains(parent),
            _ => true,
        }
    }

    fn check_fault(&self, path: &Path, op: FaultOp) -> BatchResult<()> {
        if self.faults.contains(&(path.to_path_buf(), op)) {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                operation: fault_operation(op),
                reason: "injected fault".into(),
            }
            .into());
        }
        Ok(())
    }
}

fn fault_operation(op: FaultOp) -> &'static str {
    match op {
        FaultOp::Copy => "copy file",
        FaultOp::Write => "write file",
        FaultOp::Append => "append to file",
        FaultOp::Remove => "remove file",
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryFilesystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFilesystem")
            .field("files", &self.list_files())
            .finish_non_exhaustive()
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    /// No symlinks here: the lexical form is canonical once it exists.
    fn canonicalize(&self, path: &Path) -> Option<PathBuf> {
        let normalized = normalize_lexically(path);
        self.exists(&normalized).then_some(normalized)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> BatchResult<()> {
        let mut inner = self.write_guard()?;
        inner.check_fault(from, FaultOp::Copy)?;
        inner.check_fault(to, FaultOp::Copy)?;

        let content = inner.files.get(from).cloned().ok_or_else(|| {
            ApplicationError::FilesystemError {
                path: from.to_path_buf(),
                operation: "copy file from",
                reason: "No such file".into(),
            }
        })?;
        if !inner.parent_exists(to) {
            return Err(ApplicationError::DirectoryMissing {
                path: to.to_path_buf(),
            }
            .into());
        }

        inner.files.insert(to.to_path_buf(), content);
        inner.calls.push(FsCall::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str, options: &WriteOptions) -> BatchResult<()> {
        let hook = {
            let mut inner = self.write_guard()?;
            inner.check_fault(path, FaultOp::Write)?;

            // Ensure parent exists
            if !inner.parent_exists(path) {
                return Err(ApplicationError::DirectoryMissing {
                    path: path.to_path_buf(),
                }
                .into());
            }

            let created = inner
                .files
                .insert(path.to_path_buf(), content.to_string())
                .is_none();
            if let (true, Some(mode)) = (created, options.mode) {
                inner.modes.insert(path.to_path_buf(), mode);
            }
            inner.calls.push(FsCall::Write(path.to_path_buf()));
            inner.write_hooks.get(path).cloned()
        };

        // Outside the lock: the hook may inspect this filesystem.
        if let Some(hook) = hook {
            hook(path);
        }
        Ok(())
    }

    fn append_file(&self, path: &Path, content: &str, _options: &WriteOptions) -> BatchResult<()> {
        let mut inner = self.write_guard()?;
        inner.check_fault(path, FaultOp::Append)?;

        let file = inner.files.get_mut(path).ok_or_else(|| {
            ApplicationError::AppendTargetMissing {
                path: path.to_path_buf(),
            }
        })?;
        file.push_str(content);
        inner.calls.push(FsCall::Append(path.to_path_buf()));
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> BatchResult<()> {
        let mut inner = self.write_guard()?;
        inner.check_fault(path, FaultOp::Remove)?;

        if inner.files.remove(path).is_none() {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                operation: "remove file",
                reason: "No such file".into(),
            }
            .into());
        }
        inner.modes.remove(path);
        inner.calls.push(FsCall::Remove(path.to_path_buf()));
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> BatchResult<String> {
        self.read_file(path).ok_or_else(|| {
            ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                operation: "read file",
                reason: "No such file".into(),
            }
            .into()
        })
    }

    fn create_dir_all(&self, path: &Path) -> BatchResult<()> {
        let mut inner = self.write_guard()?;
        inner.add_dir_all(path);
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> BatchResult<()> {
        let mut inner = self.write_guard()?;

        let occupied = inner.files.keys().any(|p| p.parent() == Some(path))
            || inner.directories.iter().any(|p| p.parent() == Some(path));
        if occupied {
            return Err(ApplicationError::FilesystemError {
                path: path.to_path_buf(),
                operation: "remove directory",
                reason: "Directory not empty".into(),
            }
            .into());
        }

        inner.directories.remove(path);
        Ok(())
    }
}
