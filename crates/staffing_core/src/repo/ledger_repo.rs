//! Allocation Ledger: committed allocations and derived availability.
//!
//! # Responsibility
//! - Own every write to `allocations`.
//! - Derive availability as `base_capacity - sum(effort_percentage)`.
//! - Enforce the capacity invariant on every commit.
//!
//! # Invariants
//! - Availability of every person stays within `[0, base_capacity]`.
//! - Commits for one person are linearizable: the capacity check and the
//!   insert run inside the person's `CommitGate` section and inside one
//!   `IMMEDIATE` transaction, so no commit decides on a stale reading.
//! - A failed commit leaves no trace; the transaction rolls back on drop.

use crate::db::migrations::ensure_schema_ready;
use crate::model::allocation::{validate_effort, Allocation, AllocationId, AvailabilitySnapshot};
use crate::model::person::PersonId;
use crate::model::project::ProjectId;
use crate::repo::commit_gate::CommitGate;
use crate::repo::directory_repo::{count_rows, row_exists};
use crate::repo::error::{EntityRef, RepoError, RepoResult};
use log::{info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::sync::Arc;
use std::time::Instant;

const ALLOCATION_SELECT_SQL: &str =
    "SELECT id, person_id, project_id, effort_percentage FROM allocations";

const AVAILABILITY_SQL: &str = "SELECT
    p.base_capacity,
    p.base_capacity - COALESCE(
        (SELECT SUM(a.effort_percentage) FROM allocations a WHERE a.person_id = p.id),
        0
    )
FROM people p
WHERE p.id = ?1;";

/// Repository interface for the Allocation Ledger.
pub trait AllocationLedger {
    /// Remaining availability of one person. `NotFound` for unknown ids.
    fn availability_of(&self, person_id: PersonId) -> RepoResult<u8>;
    /// Allocations held by one person, in commit order.
    fn allocations_for_person(&self, person_id: PersonId) -> RepoResult<Vec<Allocation>>;
    /// Allocations staffed onto one project, in commit order.
    fn allocations_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<Allocation>>;
    /// Validates and atomically records a new allocation.
    ///
    /// # Errors
    /// - `Validation` unless `0 < effort_percentage <= 100`.
    /// - `NotFound` for an unknown person or project.
    /// - `CapacityExceeded` when `effort_percentage` is above availability.
    fn commit(
        &self,
        person_id: PersonId,
        project_id: ProjectId,
        effort_percentage: i64,
    ) -> RepoResult<Allocation>;
    /// Removes an allocation and returns it, freeing its effort.
    fn release(&self, allocation_id: AllocationId) -> RepoResult<Allocation>;
    /// Availability of every registered person, read in one statement.
    fn snapshot(&self) -> RepoResult<AvailabilitySnapshot>;
    fn count_allocations(&self) -> RepoResult<u64>;
}

/// SQLite-backed Allocation Ledger.
pub struct SqliteAllocationLedger<'conn> {
    conn: &'conn Connection,
    gate: Arc<CommitGate>,
}

impl<'conn> SqliteAllocationLedger<'conn> {
    /// Creates a ledger with its own private commit gate.
    ///
    /// Handles on other connections are still serialized by the database
    /// write lock; share a gate through `with_gate` to serialize in-process.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_gate(conn, CommitGate::shared())
    }

    /// Creates a ledger that serializes commits through a shared gate.
    pub fn with_gate(conn: &'conn Connection, gate: Arc<CommitGate>) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        Ok(Self { conn, gate })
    }

    /// Gate used by this handle, for sharing with handles on other
    /// connections.
    pub fn gate(&self) -> Arc<CommitGate> {
        Arc::clone(&self.gate)
    }

    fn commit_serialized(
        &self,
        person_id: PersonId,
        project_id: ProjectId,
        effort: u8,
    ) -> RepoResult<(Allocation, u8)> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let available = read_availability(&tx, person_id)?
            .ok_or(RepoError::NotFound(EntityRef::Person(person_id)))?;
        if !row_exists(&tx, "SELECT 1 FROM projects WHERE id = ?1;", project_id)? {
            return Err(RepoError::NotFound(EntityRef::Project(project_id)));
        }
        if effort > available {
            return Err(RepoError::CapacityExceeded {
                person_id,
                requested: effort,
                available,
            });
        }

        tx.execute(
            "INSERT INTO allocations (person_id, project_id, effort_percentage)
             VALUES (?1, ?2, ?3);",
            params![person_id, project_id, effort],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        let allocation = Allocation {
            id,
            person_id,
            project_id,
            effort_percentage: effort,
        };
        Ok((allocation, available - effort))
    }
}

impl AllocationLedger for SqliteAllocationLedger<'_> {
    fn availability_of(&self, person_id: PersonId) -> RepoResult<u8> {
        read_availability(self.conn, person_id)?
            .ok_or(RepoError::NotFound(EntityRef::Person(person_id)))
    }

    fn allocations_for_person(&self, person_id: PersonId) -> RepoResult<Vec<Allocation>> {
        if !row_exists(self.conn, "SELECT 1 FROM people WHERE id = ?1;", person_id)? {
            return Err(RepoError::NotFound(EntityRef::Person(person_id)));
        }
        list_allocations(
            self.conn,
            &format!("{ALLOCATION_SELECT_SQL} WHERE person_id = ?1 ORDER BY id ASC;"),
            person_id,
        )
    }

    fn allocations_for_project(&self, project_id: ProjectId) -> RepoResult<Vec<Allocation>> {
        if !row_exists(self.conn, "SELECT 1 FROM projects WHERE id = ?1;", project_id)? {
            return Err(RepoError::NotFound(EntityRef::Project(project_id)));
        }
        list_allocations(
            self.conn,
            &format!("{ALLOCATION_SELECT_SQL} WHERE project_id = ?1 ORDER BY id ASC;"),
            project_id,
        )
    }

    fn commit(
        &self,
        person_id: PersonId,
        project_id: ProjectId,
        effort_percentage: i64,
    ) -> RepoResult<Allocation> {
        let started_at = Instant::now();
        let effort = match validate_effort(effort_percentage) {
            Ok(effort) => effort,
            Err(err) => {
                warn!(
                    "event=allocation_commit module=ledger status=rejected person_id={person_id} project_id={project_id} error_code=validation_failed effort={effort_percentage}"
                );
                return Err(err.into());
            }
        };

        let outcome = self.gate.with_person(person_id, || {
            self.commit_serialized(person_id, project_id, effort)
        });

        match outcome {
            Ok((allocation, remaining)) => {
                info!(
                    "event=allocation_commit module=ledger status=ok allocation_id={} person_id={person_id} project_id={project_id} effort={effort} remaining={remaining} duration_ms={}",
                    allocation.id,
                    started_at.elapsed().as_millis()
                );
                Ok(allocation)
            }
            Err(err) => {
                warn!(
                    "event=allocation_commit module=ledger status=rejected person_id={person_id} project_id={project_id} effort={effort} error_code={} duration_ms={}",
                    err.code(),
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    fn release(&self, allocation_id: AllocationId) -> RepoResult<Allocation> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let allocation = tx
            .query_row(
                &format!("{ALLOCATION_SELECT_SQL} WHERE id = ?1;"),
                [allocation_id],
                |row| Ok(parse_allocation_row(row)),
            )
            .optional()?
            .transpose()?
            .ok_or(RepoError::NotFound(EntityRef::Allocation(allocation_id)))?;
        tx.execute("DELETE FROM allocations WHERE id = ?1;", [allocation_id])?;
        tx.commit()?;

        info!(
            "event=allocation_release module=ledger status=ok allocation_id={allocation_id} person_id={} project_id={} effort={}",
            allocation.person_id, allocation.project_id, allocation.effort_percentage
        );
        Ok(allocation)
    }

    fn snapshot(&self) -> RepoResult<AvailabilitySnapshot> {
        let mut stmt = self.conn.prepare(
            "SELECT
                p.id,
                p.base_capacity,
                p.base_capacity - COALESCE(SUM(a.effort_percentage), 0)
             FROM people p
             LEFT JOIN allocations a ON a.person_id = p.id
             GROUP BY p.id
             ORDER BY p.id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut snapshot = AvailabilitySnapshot::new();
        while let Some(row) = rows.next()? {
            let person_id: PersonId = row.get(0)?;
            let availability = checked_availability(person_id, row.get(1)?, row.get(2)?)?;
            snapshot.insert(person_id, availability);
        }
        Ok(snapshot)
    }

    fn count_allocations(&self) -> RepoResult<u64> {
        count_rows(self.conn, "SELECT COUNT(*) FROM allocations;")
    }
}

/// Reads one person's availability; `None` when the person does not exist.
fn read_availability(conn: &Connection, person_id: PersonId) -> RepoResult<Option<u8>> {
    let raw = conn
        .query_row(AVAILABILITY_SQL, [person_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
        })
        .optional()?;
    match raw {
        Some((base_capacity, remaining)) => {
            Ok(Some(checked_availability(person_id, base_capacity, remaining)?))
        }
        None => Ok(None),
    }
}

/// Rejects persisted state that breaks `0 <= availability <= base_capacity`.
fn checked_availability(person_id: PersonId, base_capacity: i64, remaining: i64) -> RepoResult<u8> {
    if !(0..=base_capacity).contains(&remaining) {
        return Err(RepoError::InvalidData(format!(
            "availability {remaining} of person {person_id} outside [0, {base_capacity}]"
        )));
    }
    u8::try_from(remaining).map_err(|_| {
        RepoError::InvalidData(format!(
            "availability {remaining} of person {person_id} does not fit a percentage"
        ))
    })
}

fn list_allocations(conn: &Connection, sql: &str, owner_id: i64) -> RepoResult<Vec<Allocation>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([owner_id])?;
    let mut allocations = Vec::new();
    while let Some(row) = rows.next()? {
        allocations.push(parse_allocation_row(row)?);
    }
    Ok(allocations)
}

fn parse_allocation_row(row: &Row<'_>) -> RepoResult<Allocation> {
    let id: AllocationId = row.get("id")?;
    let raw_effort: i64 = row.get("effort_percentage")?;
    let effort_percentage = validate_effort(raw_effort).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid effort_percentage `{raw_effort}` in allocations.effort_percentage for id {id}"
        ))
    })?;

    Ok(Allocation {
        id,
        person_id: row.get("person_id")?,
        project_id: row.get("project_id")?,
        effort_percentage,
    })
}
