//! Staffing domain model.
//!
//! # Responsibility
//! - Define canonical records for people, projects, skills and allocations.
//! - Provide write-side validation shared by every repository.
//!
//! # Invariants
//! - Every record is identified by a stable integer id assigned in insertion
//!   order; ascending id equals registration order.
//! - Skill identity is canonical: associations reference skills by id and
//!   never embed divergent copies.
//! - A person's availability always lies in `[0, base_capacity]`.

pub mod allocation;
pub mod person;
pub mod project;
pub mod skill;
pub mod validation;
