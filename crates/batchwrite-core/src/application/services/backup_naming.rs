//! Where a commit keeps the pre-commit copy of a file.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Strategy deriving the temporary backup location of a target.
///
/// Must return the same path for the same target for the lifetime of a
/// writer, and paths that do not collide across runs.
pub trait BackupNaming: Send + Sync {
    fn backup_path(&self, target: &Path) -> PathBuf;
}

/// Sibling file named `<file name>.<digest>.bak`.
///
/// The digest is the first 16 bytes of SHA-256 over the target path and a
/// run id, hex-encoded. Keeping the backup next to its original keeps the
/// copy on the same filesystem.
#[derive(Debug, Clone)]
pub struct HashedSiblingNaming {
    run_id: String,
}

impl HashedSiblingNaming {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
        }
    }

    /// Run id of `<pid>-<uuid v4>`.
    ///
    /// The uuid part keeps names apart even when the OS reuses a pid.
    pub fn for_current_process() -> Self {
        Self::new(format!("{}-{}", std::process::id(), Uuid::new_v4()))
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    fn digest(&self, target: &Path) -> String {
        let mut hasher = Sha256::new();
        hasher.update(target.as_os_str().as_encoded_bytes());
        hasher.update([0u8]);
        hasher.update(self.run_id.as_bytes());
        let digest = hasher.finalize();
        hex::encode(&digest[..16])
    }
}

impl Default for HashedSiblingNaming {
    fn default() -> Self {
        Self::for_current_process()
    }
}

impl BackupNaming for HashedSiblingNaming {
    fn backup_path(&self, target: &Path) -> PathBuf {
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        target.with_file_name(format!("{name}.{}.bak", self.digest(target)))
    }
}
