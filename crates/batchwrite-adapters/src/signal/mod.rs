//! Termination signal adapters.
//!
//! Both keep a table of registered cancellation tokens. A signal cancels
//! every token in the table; the committing thread notices and reverts.

mod manual;
mod process;

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use batchwrite_core::application::{CancellationToken, RegistrationId};

pub use manual::ManualSignals;
pub use process::CtrlcSignals;

/// Registered tokens keyed by their registration id.
#[derive(Debug, Default)]
pub(crate) struct Registrations {
    next_id: AtomicU64,
    tokens: Mutex<BTreeMap<RegistrationId, CancellationToken>>,
}

impl Registrations {
    pub(crate) fn insert(&self, token: CancellationToken) -> Option<RegistrationId> {
        let id = RegistrationId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let mut tokens = self.tokens.lock().ok()?;
        tokens.insert(id, token);
        Some(id)
    }

    pub(crate) fn remove(&self, id: RegistrationId) {
        // A poisoned table still holds valid tokens.
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens.remove(&id);
    }

    /// Cancel every registered token. Returns how many were cancelled.
    pub(crate) fn cancel_all(&self) -> usize {
        let tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        for token in tokens.values() {
            token.cancel();
        }
        tokens.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.tokens
            .lock()
            .map(|tokens| tokens.len())
            .unwrap_or_else(|e| e.into_inner().len())
    }
}
