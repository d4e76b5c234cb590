//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "commit this batch of file changes".

pub mod backup_naming;
pub mod batch_writer;
pub mod cancellation;
mod commit_state;

pub use backup_naming::{BackupNaming, HashedSiblingNaming};
pub use batch_writer::{BatchFileWriter, CommitReport};
pub use cancellation::{CancellationToken, InterruptGuard, RegistrationId};
