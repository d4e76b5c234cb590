//! Infrastructure adapters for batchwrite.
//!
//! This crate implements the ports defined in `batchwrite-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod filesystem;
pub mod signal;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use signal::{CtrlcSignals, ManualSignals};
