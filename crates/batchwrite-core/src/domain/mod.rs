//! Core domain layer for batchwrite.
//!
//! Pure data: operations, options and the queue that orders them. No
//! filesystem access happens here; the application layer drives I/O
//! through ports.
//!
//! ## Rules
//!
//! - **No I/O**: queuing never touches the filesystem
//! - **Immutable operations**: an `Operation` does not change once queued
//! - **Appends first**: the queue always yields appends before writes

pub mod error;
pub mod operation;
pub mod path;
pub mod queue;

mod validation;

pub use error::{DomainError, ErrorCategory};
pub use operation::{MAX_MODE, Operation, OperationKind, WriteOptions};
pub use path::normalize_lexically;
pub use queue::OperationQueue;
pub use validation::DomainValidator;
