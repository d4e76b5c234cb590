//! batchwrite Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for a
//! transactional batch file writer: queue writes and appends, then commit
//! them all or none of them.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         batchwrite-cli (CLI)            │
//! │   (builds (path, content) batches)      │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │           (BatchFileWriter)             │
//! │   backup → mutate → commit | revert     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │     (Filesystem, SignalRegistry)        │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    batchwrite-adapters (Infrastructure) │
//! │ (LocalFilesystem, CtrlcSignals, etc)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use batchwrite_core::prelude::*;
//!
//! let mut writer = BatchFileWriter::new(filesystem, signals);
//! writer.queue_append("log.txt", "B", WriteOptions::default());
//! writer.queue_write("a.txt", "hello", WriteOptions::default());
//!
//! match writer.commit() {
//!     Ok(report) => println!("{} operations applied", report.operation_count()),
//!     Err(e) if e.is_fatal() => eprintln!("files may be partially modified: {e}"),
//!     Err(e) => eprintln!("nothing changed: {e}"),
//! }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        BatchFileWriter, CancellationToken, CommitReport,
        ports::{Filesystem, SignalRegistry},
    };
    pub use crate::domain::{Operation, OperationKind, OperationQueue, WriteOptions};
    pub use crate::error::{BatchError, BatchResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
