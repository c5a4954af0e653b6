//! Skill domain model.
//!
//! # Invariants
//! - Skill names are unique under case-insensitive comparison.
//! - The first spelling registered is kept as the display name.
//! - Skills are immutable once created.

use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Stable skill identifier (SQLite row id).
pub type SkillId = i64;

/// Canonical skill record referenced by people and projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Skill {
    pub id: SkillId,
    /// Display spelling as first registered.
    pub name: String,
}

/// Returns the `(display_name, lookup_key)` pair for a raw skill name.
///
/// The lookup key is the trimmed, lowercased name and is what uniqueness is
/// enforced on.
pub fn normalize_skill_name(raw: &str) -> Result<(String, String), ValidationError> {
    let display = require_text("skill_name", raw)?;
    Ok((display.to_string(), display.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::normalize_skill_name;
    use crate::model::validation::ValidationError;

    #[test]
    fn normalize_keeps_spelling_and_lowercases_key() {
        let (display, key) = normalize_skill_name("  Rust ").unwrap();
        assert_eq!(display, "Rust");
        assert_eq!(key, "rust");
    }

    #[test]
    fn normalize_folds_non_ascii_case() {
        let (_, key) = normalize_skill_name("ÜBERSETZUNG").unwrap();
        assert_eq!(key, "übersetzung");
    }

    #[test]
    fn normalize_rejects_blank() {
        assert_eq!(
            normalize_skill_name("   ").unwrap_err(),
            ValidationError::BlankField("skill_name")
        );
    }
}
