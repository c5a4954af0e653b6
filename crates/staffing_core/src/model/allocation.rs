//! Allocation domain model and derived availability.
//!
//! # Responsibility
//! - Define committed allocations and effort validation.
//! - Carry a read-only availability snapshot for pure scoring.
//!
//! # Invariants
//! - `effort_percentage` lies in `(0, 100]`.
//! - Allocations are never edited in place; a change is release + commit.

use crate::model::person::{Person, PersonId};
use crate::model::project::ProjectId;
use crate::model::validation::{require_percent, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Stable allocation identifier (SQLite row id).
pub type AllocationId = i64;

/// Committed share of one person's capacity on one project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub id: AllocationId,
    pub person_id: PersonId,
    pub project_id: ProjectId,
    pub effort_percentage: u8,
}

/// Validates a raw effort percentage into `(0, 100]`.
pub fn validate_effort(effort_percentage: i64) -> Result<u8, ValidationError> {
    require_percent(effort_percentage, ValidationError::EffortOutOfRange)
}

/// Point-in-time availability of every registered person.
///
/// Read from the ledger in one statement and then handed to the scorer, so a
/// ranking pass never sees a half-applied commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailabilitySnapshot {
    by_person: BTreeMap<PersonId, u8>,
}

impl AvailabilitySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from `(person_id, availability)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (PersonId, u8)>) -> Self {
        Self {
            by_person: entries.into_iter().collect(),
        }
    }

    pub fn insert(&mut self, person_id: PersonId, availability: u8) {
        self.by_person.insert(person_id, availability);
    }

    pub fn get(&self, person_id: PersonId) -> Option<u8> {
        self.by_person.get(&person_id).copied()
    }

    /// Availability of `person`; an unknown person is fully available.
    pub fn availability_of(&self, person: &Person) -> u8 {
        self.get(person.id)
            .unwrap_or(person.base_capacity)
            .min(person.base_capacity)
    }

    /// Number of people with no remaining availability.
    pub fn fully_booked_count(&self) -> usize {
        self.by_person.values().filter(|value| **value == 0).count()
    }

    pub fn len(&self) -> usize {
        self.by_person.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_person.is_empty()
    }
}
