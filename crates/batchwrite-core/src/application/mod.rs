//! Application layer for batchwrite.
//!
//! This layer contains:
//! - **Services**: `BatchFileWriter` and its commit machinery
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! Operation validation lives in `crate::domain`; this layer drives the
//! filesystem and reacts to termination signals.

pub mod error;
pub mod ports;
pub mod services;

// Re-export main services
pub use services::{
    BackupNaming, BatchFileWriter, CancellationToken, CommitReport, HashedSiblingNaming,
    InterruptGuard, RegistrationId,
};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, SignalRegistry};

pub use error::{ApplicationError, RevertFailure, RevertStep};
