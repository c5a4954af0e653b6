//! Repository layer: the Directory Store and the Allocation Ledger.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - The directory repository is the only writer of people, projects and
//!   skills; the ledger is the only writer of allocations.
//! - Write paths validate input before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod commit_gate;
pub mod directory_repo;
pub mod error;
pub mod ledger_repo;
