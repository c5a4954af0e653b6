//! Shared error taxonomy for directory and ledger operations.

use crate::db::DbError;
use crate::model::allocation::AllocationId;
use crate::model::person::PersonId;
use crate::model::project::ProjectId;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Identifies the record a `NotFound` error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Person(PersonId),
    Project(ProjectId),
    Allocation(AllocationId),
}

impl Display for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Person(id) => write!(f, "person {id}"),
            Self::Project(id) => write!(f, "project {id}"),
            Self::Allocation(id) => write!(f, "allocation {id}"),
        }
    }
}

/// Error for directory, ledger and allocation service operations.
///
/// `Validation`, `NotFound` and `CapacityExceeded` are expected conditions a
/// caller can recover from. `Db` and `InvalidData` come from the storage
/// layer and are passed through unmodified.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    NotFound(EntityRef),
    /// Commit would push the person's availability below zero.
    CapacityExceeded {
        person_id: PersonId,
        requested: u8,
        available: u8,
    },
    Db(DbError),
    InvalidData(String),
}

impl RepoError {
    /// Stable machine-readable code used in log events and boundary payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound(_) => "not_found",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::Db(_) => "db_error",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(entity) => write!(f, "{entity} not found"),
            Self::CapacityExceeded {
                person_id,
                requested,
                available,
            } => write!(
                f,
                "person {person_id} has {available}% availability left; cannot commit {requested}%"
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted staffing data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::CapacityExceeded { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
