//! Core domain logic for staffing: matching people to projects and
//! enforcing capacity.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod scoring;
pub mod service;

pub use config::{ConfigError, EngineConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::allocation::{Allocation, AllocationId, AvailabilitySnapshot};
pub use model::person::{NewPerson, Person, PersonId, DEFAULT_BASE_CAPACITY};
pub use model::project::{NewProject, Project, ProjectId, ProjectStatus};
pub use model::skill::{Skill, SkillId};
pub use model::validation::ValidationError;
pub use repo::commit_gate::CommitGate;
pub use repo::directory_repo::{DirectoryRepository, SqliteDirectoryRepository};
pub use repo::error::{EntityRef, RepoError, RepoResult};
pub use repo::ledger_repo::{AllocationLedger, SqliteAllocationLedger};
pub use scoring::{
    rank, score, EmptyRequirements, FitScore, MatchFactor, ScoreBreakdown, ScoringPolicy,
    Suggestion,
};
pub use service::allocation_service::{AllocationService, StaffingSummary};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
