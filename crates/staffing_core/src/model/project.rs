//! Project domain model.
//!
//! # Invariants
//! - `name` is non-empty after trimming; `description` may be empty.
//! - `required_skills` holds each skill at most once, ordered by skill id.

use crate::model::skill::{Skill, SkillId};
use crate::model::validation::{require_text, ValidationError};
use serde::{Deserialize, Serialize};

/// Stable project identifier (SQLite row id).
pub type ProjectId = i64;

/// Project lifecycle label. Informational only; it does not gate matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    OnHold,
}

impl ProjectStatus {
    /// Stable storage/wire label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::OnHold => "on_hold",
        }
    }

    /// Parses a storage/wire label, accepting any casing.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            "on_hold" | "onhold" => Some(Self::OnHold),
            _ => None,
        }
    }
}

/// Project with nested required skills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub required_skills: Vec<Skill>,
}

impl Project {
    /// Returns whether `skill_id` is among the required skills.
    pub fn requires_skill(&self, skill_id: SkillId) -> bool {
        self.required_skills.iter().any(|skill| skill.id == skill_id)
    }
}

/// Creation request for a new project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
        }
    }

    /// Validates and normalizes the request into `(name, description)`.
    pub fn validate(&self) -> Result<(&str, &str), ValidationError> {
        let name = require_text("project.name", &self.name)?;
        let description = self.description.as_deref().map_or("", str::trim);
        Ok((name, description))
    }
}
