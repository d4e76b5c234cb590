use std::path::PathBuf;

use crate::domain::operation::{Operation, OperationKind, WriteOptions};

/// Pending operations of one batch.
///
/// Appends and writes are kept in separate sequences. Whatever order the
/// caller interleaves them in, every append is applied before any write,
/// and each sequence is applied first-queued, first-applied.
#[derive(Debug, Clone, Default)]
pub struct OperationQueue {
    appends: Vec<Operation>,
    writes: Vec<Operation>,
}

impl OperationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_write(
        &mut self,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        options: WriteOptions,
    ) {
        self.writes.push(Operation::write(path, content, options));
    }

    pub fn push_append(
        &mut self,
        path: impl Into<PathBuf>,
        content: impl Into<String>,
        options: WriteOptions,
    ) {
        self.appends.push(Operation::append(path, content, options));
    }

    /// Push an already-built operation onto the matching sequence.
    pub fn push(&mut self, op: Operation) {
        match op.kind() {
            OperationKind::Append => self.appends.push(op),
            OperationKind::Write => self.writes.push(op),
        }
    }

    pub fn len(&self) -> usize {
        self.appends.len() + self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appends.is_empty() && self.writes.is_empty()
    }

    /// Operations in the order a commit applies them.
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.appends.iter().chain(self.writes.iter())
    }

    /// Take every queued operation, leaving the queue empty.
    ///
    /// Returns `(appends, writes)`.
    pub fn drain(&mut self) -> (Vec<Operation>, Vec<Operation>) {
        (
            std::mem::take(&mut self.appends),
            std::mem::take(&mut self.writes),
        )
    }
}
