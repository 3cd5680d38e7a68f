//! Process-local pending-request store
//!
//! State and verifier live in separate slots because they are consumed at
//! different times: the state when the callback validates it, the verifier
//! after a successful code exchange.

use parking_lot::Mutex;
use passage_core::PendingRequestStore;
use passage_domain::{PendingAuthorization, Result};

#[derive(Debug, Default)]
struct Slots {
    state: Option<String>,
    code_verifier: Option<String>,
}

/// [`PendingRequestStore`] that lives for the lifetime of the process
#[derive(Debug, Default)]
pub struct InMemoryPendingStore {
    slots: Mutex<Slots>,
}

impl InMemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        let slots = self.slots.lock();
        slots.state.is_none() && slots.code_verifier.is_none()
    }
}

impl PendingRequestStore for InMemoryPendingStore {
    fn save(&self, pending: PendingAuthorization) -> Result<()> {
        let mut slots = self.slots.lock();
        slots.state = Some(pending.state);
        slots.code_verifier = pending.code_verifier;
        Ok(())
    }

    fn take_state(&self) -> Option<String> {
        self.slots.lock().state.take()
    }

    fn code_verifier(&self) -> Option<String> {
        self.slots.lock().code_verifier.clone()
    }

    fn discard_verifier(&self) {
        self.slots.lock().code_verifier = None;
    }

    fn clear(&self) {
        *self.slots.lock() = Slots::default();
    }
}
