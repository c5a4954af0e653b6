//! Person domain model.
//!
//! # Responsibility
//! - Define the registered person record and its registration request.
//!
//! # Invariants
//! - `name` and `role` are non-empty after trimming.
//! - `base_capacity` lies in `[1, 100]` and defaults to 100.
//! - `skills` holds each skill at most once, ordered by skill id.

use crate::model::skill::{Skill, SkillId};
use crate::model::validation::{require_percent, require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Stable person identifier (SQLite row id).
pub type PersonId = i64;

/// Capacity every person gets unless registered with an explicit value.
pub const DEFAULT_BASE_CAPACITY: u8 = 100;

/// Registered person with nested skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    /// Free-form job title, e.g. "Developer" or "Designer".
    pub role: String,
    /// Maximum total effort percentage across all allocations.
    pub base_capacity: u8,
    pub skills: Vec<Skill>,
}

impl Person {
    /// Returns whether this person holds the skill with `skill_id`.
    pub fn has_skill(&self, skill_id: SkillId) -> bool {
        self.skills.iter().any(|skill| skill.id == skill_id)
    }
}

/// Registration request for a new person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    pub name: String,
    pub role: String,
    pub base_capacity: i64,
}

impl NewPerson {
    /// Creates a request with the default base capacity.
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self::with_capacity(name, role, i64::from(DEFAULT_BASE_CAPACITY))
    }

    /// Creates a request with an explicit base capacity.
    pub fn with_capacity(
        name: impl Into<String>,
        role: impl Into<String>,
        base_capacity: i64,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            base_capacity,
        }
    }

    /// Validates and normalizes the request.
    ///
    /// Returns `(name, role, base_capacity)` with text fields trimmed.
    pub fn validate(&self) -> Result<(&str, &str, u8), ValidationError> {
        let name = require_text("person.name", &self.name)?;
        let role = require_text("person.role", &self.role)?;
        let base_capacity =
            require_percent(self.base_capacity, ValidationError::CapacityOutOfRange)?;
        Ok((name, role, base_capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::{NewPerson, DEFAULT_BASE_CAPACITY};
    use crate::model::validation::ValidationError;

    #[test]
    fn new_person_defaults_to_full_capacity() {
        let request = NewPerson::new(" Ada ", "Developer");
        assert_eq!(
            request.validate().unwrap(),
            ("Ada", "Developer", DEFAULT_BASE_CAPACITY)
        );
    }

    #[test]
    fn blank_role_is_rejected() {
        let err = NewPerson::new("Ada", "  ").validate().unwrap_err();
        assert_eq!(err, ValidationError::BlankField("person.role"));
    }

    #[test]
    fn capacity_outside_range_is_rejected() {
        let err = NewPerson::with_capacity("Ada", "Dev", 0)
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::CapacityOutOfRange(0));
    }
}
