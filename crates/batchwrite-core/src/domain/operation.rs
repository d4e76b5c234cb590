use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Highest value accepted for [`WriteOptions::mode`].
pub const MAX_MODE: u32 = 0o7777;

/// What an [`Operation`] does to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Replace the file content, creating the file if needed.
    Write,
    /// Add to the end of an existing file.
    Append,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write => write!(f, "write"),
            Self::Append => write!(f, "append"),
        }
    }
}

/// Options applied when an operation touches the filesystem.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriteOptions {
    /// Unix permission bits for a file created by a write.
    ///
    /// Ignored for files that already exist and on non-Unix platforms.
    pub mode: Option<u32>,
}

impl WriteOptions {
    pub const fn new() -> Self {
        Self { mode: None }
    }

    pub const fn with_mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }
}

/// A pending unit of work. Immutable once queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    path: PathBuf,
    content: String,
    kind: OperationKind,
    options: WriteOptions,
}

impl Operation {
    pub fn write(path: impl Into<PathBuf>, content: impl Into<String>, options: WriteOptions) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            kind: OperationKind::Write,
            options,
        }
    }

    pub fn append(
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        options: WriteOptions,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            kind: OperationKind::Append,
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Same operation aimed at a different path.
    pub(crate) fn retarget(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.path.as_os_str().is_empty() {
            return Err(DomainError::EmptyPath);
        }

        if let Some(mode) = self.options.mode {
            if mode > MAX_MODE {
                return Err(DomainError::InvalidMode {
                    path: self.path.display().to_string(),
                    mode,
                });
            }
        }

        Ok(())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({} bytes)",
            self.kind,
            self.path.display(),
            self.content.len()
        )
    }
}
