//! Per-person serialization of ledger commits.
//!
//! # Responsibility
//! - Hand out one exclusive section per person id.
//! - Let commits for different people proceed without waiting on each other.
//!
//! # Invariants
//! - At most one closure runs inside `with_person(id, ..)` for a given id at
//!   any time, across every ledger handle sharing the same gate.
//! - Slots are created lazily and never removed, so two callers can never
//!   hold different mutexes for the same person.

use crate::model::person::PersonId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Registry of per-person commit mutexes.
#[derive(Debug, Default)]
pub struct CommitGate {
    slots: RwLock<HashMap<PersonId, Arc<Mutex<()>>>>,
}

impl CommitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a gate ready to be shared between ledger handles.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Runs `f` while holding the exclusive section for `person_id`.
    pub fn with_person<T>(&self, person_id: PersonId, f: impl FnOnce() -> T) -> T {
        let slot = self.slot(person_id);
        // The mutex guards no data, so a panic in another holder leaves
        // nothing inconsistent behind.
        let _guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of people that have committed through this gate.
    pub fn tracked_people(&self) -> usize {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn slot(&self, person_id: PersonId) -> Arc<Mutex<()>> {
        {
            let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = slots.get(&person_id) {
                return Arc::clone(slot);
            }
        }
        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(person_id).or_default())
    }
}
