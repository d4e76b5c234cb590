//! Local filesystem adapter using std::fs.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::trace;

use batchwrite_core::{
    application::{ApplicationError, ports::Filesystem},
    domain::WriteOptions,
    error::{BatchError, BatchResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn canonicalize(&self, path: &Path) -> Option<PathBuf> {
        std::fs::canonicalize(path).ok()
    }

    fn copy_file(&self, from: &Path, to: &Path) -> BatchResult<()> {
        trace!(from = %from.display(), to = %to.display(), "copy");
        std::fs::copy(from, to).map(|_| ()).map_err(|e| {
            if from.is_file() {
                map_write_error(to, e, "copy file to")
            } else {
                map_io_error(from, e, "copy file from")
            }
        })
    }

    fn write_file(&self, path: &Path, content: &str, options: &WriteOptions) -> BatchResult<()> {
        trace!(path = %path.display(), bytes = content.len(), "write");
        let mut open = OpenOptions::new();
        open.write(true).create(true).truncate(true);

        #[cfg(unix)]
        if let Some(mode) = options.mode {
            use std::os::unix::fs::OpenOptionsExt;
            // Only takes effect when the file is created; umask still applies.
            open.mode(mode);
        }
        #[cfg(not(unix))]
        {
            let _ = options; // No Unix permission bits here
        }

        let mut file = open
            .open(path)
            .map_err(|e| map_write_error(path, e, "write file"))?;
        file.write_all(content.as_bytes())
            .map_err(|e| map_io_error(path, e, "write file"))
    }

    fn append_file(&self, path: &Path, content: &str, _options: &WriteOptions) -> BatchResult<()> {
        trace!(path = %path.display(), bytes = content.len(), "append");
        let mut file = OpenOptions::new().append(true).open(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ApplicationError::AppendTargetMissing {
                    path: path.to_path_buf(),
                }
                .into()
            } else {
                map_io_error(path, e, "append to file")
            }
        })?;
        file.write_all(content.as_bytes())
            .map_err(|e| map_io_error(path, e, "append to file"))
    }

    fn remove_file(&self, path: &Path) -> BatchResult<()> {
        trace!(path = %path.display(), "remove");
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }

    fn read_to_string(&self, path: &Path) -> BatchResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn create_dir_all(&self, path: &Path) -> BatchResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn remove_dir(&self, path: &Path) -> BatchResult<()> {
        std::fs::remove_dir(path).map_err(|e| map_io_error(path, e, "remove directory"))
    }
}

/// Like [`map_io_error`], but reports a missing parent as `DirectoryMissing`.
fn map_write_error(path: &Path, e: io::Error, operation: &'static str) -> BatchError {
    let parent_missing = path
        .parent()
        .is_some_and(|p| !p.as_os_str().is_empty() && !p.is_dir());

    if e.kind() == io::ErrorKind::NotFound && parent_missing {
        ApplicationError::DirectoryMissing {
            path: path.to_path_buf(),
        }
        .into()
    } else {
        map_io_error(path, e, operation)
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &'static str) -> BatchError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        operation,
        reason: e.to_string(),
    }
    .into()
}
