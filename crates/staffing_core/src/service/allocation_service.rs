//! Allocation use-case service.
//!
//! # Responsibility
//! - Rank candidates for a project from directory and ledger state.
//! - Commit allocations after confirming both ids resolve.
//! - Summarize staffing counters for dashboards.
//!
//! # Invariants
//! - Service APIs never bypass the ledger's capacity check.
//! - Errors from the directory or ledger surface unchanged.
//! - The service holds no persistent state of its own.

use crate::model::allocation::{Allocation, AllocationId};
use crate::model::person::{Person, PersonId};
use crate::model::project::{Project, ProjectId};
use crate::repo::directory_repo::DirectoryRepository;
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use crate::repo::ledger_repo::AllocationLedger;
use crate::scoring::{rank, ScoringPolicy, Suggestion};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingSummary {
    pub people: u64,
    pub projects: u64,
    pub allocations: u64,
    /// People with zero availability left.
    pub fully_booked: u64,
}

/// Orchestrates the Directory Store, Allocation Ledger and Match Scorer.
pub struct AllocationService<D: DirectoryRepository, L: AllocationLedger> {
    directory: D,
    ledger: L,
    policy: ScoringPolicy,
}

impl<D: DirectoryRepository, L: AllocationLedger> AllocationService<D, L> {
    /// Creates a service with the default scoring policy.
    pub fn new(directory: D, ledger: L) -> Self {
        Self::with_policy(directory, ledger, ScoringPolicy::default())
    }

    pub fn with_policy(directory: D, ledger: L, policy: ScoringPolicy) -> Self {
        Self {
            directory,
            ledger,
            policy,
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    /// Ranks every registered person for `project_id`.
    ///
    /// # Contract
    /// - `NotFound` when the project is unknown.
    /// - Returns the full list; limiting is a caller concern.
    /// - Identical inputs yield identical order, scores and reasons.
    pub fn suggest(&self, project_id: ProjectId) -> RepoResult<Vec<Suggestion>> {
        let started_at = Instant::now();
        let project = self.require_project(project_id)?;
        let people = self.directory.list_people()?;
        let snapshot = self.ledger.snapshot()?;

        let suggestions = rank(people, &project, &snapshot, &self.policy);
        debug!(
            "event=suggest module=allocation status=ok project_id={project_id} candidates={} duration_ms={}",
            suggestions.len(),
            started_at.elapsed().as_millis()
        );
        Ok(suggestions)
    }

    /// Commits `effort_percentage` of `person_id` to `project_id`.
    ///
    /// # Contract
    /// - `NotFound` when either id is unknown.
    /// - `Validation` when effort is outside `(0, 100]`.
    /// - `CapacityExceeded` when effort is above the person's availability.
    /// - On any failure nothing is written.
    pub fn allocate(
        &self,
        person_id: PersonId,
        project_id: ProjectId,
        effort_percentage: i64,
    ) -> RepoResult<Allocation> {
        self.require_person(person_id)?;
        self.require_project(project_id)?;
        self.ledger.commit(person_id, project_id, effort_percentage)
    }

    /// Releases one allocation, returning the freed effort to its person.
    pub fn release(&self, allocation_id: AllocationId) -> RepoResult<Allocation> {
        self.ledger.release(allocation_id)
    }

    pub fn availability_of(&self, person_id: PersonId) -> RepoResult<u8> {
        self.ledger.availability_of(person_id)
    }

    /// Counts people, projects, allocations and fully booked people.
    pub fn staffing_summary(&self) -> RepoResult<StaffingSummary> {
        let snapshot = self.ledger.snapshot()?;
        let summary = StaffingSummary {
            people: self.directory.count_people()?,
            projects: self.directory.count_projects()?,
            allocations: self.ledger.count_allocations()?,
            fully_booked: snapshot.fully_booked_count() as u64,
        };
        info!(
            "event=staffing_summary module=allocation status=ok people={} projects={} allocations={} fully_booked={}",
            summary.people, summary.projects, summary.allocations, summary.fully_booked
        );
        Ok(summary)
    }

    fn require_person(&self, person_id: PersonId) -> RepoResult<Person> {
        self.directory
            .get_person(person_id)?
            .ok_or(RepoError::NotFound(EntityRef::Person(person_id)))
    }

    fn require_project(&self, project_id: ProjectId) -> RepoResult<Project> {
        self.directory
            .get_project(project_id)?
            .ok_or(RepoError::NotFound(EntityRef::Project(project_id)))
    }
}
