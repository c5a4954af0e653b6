//! Boundary envelopes for command output.
//!
//! # Responsibility
//! - Wrap engine results into one stable JSON envelope per command.
//! - Map typed engine failures to status labels and readable messages.
//!
//! # Invariants
//! - Every command prints exactly one envelope.
//! - `ok == false` always carries a non-empty `message`.

use serde::Serialize;
use serde_json::Value;
use staffing_core::RepoError;

/// Envelope printed for every command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResponse {
    pub ok: bool,
    /// `ok` on success, otherwise a stable failure label.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub message: String,
}

impl CommandResponse {
    pub fn success(message: impl Into<String>, data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                ok: true,
                status: "ok",
                data: Some(data),
                message: message.into(),
            },
            Err(err) => Self::failure("serialization_error", format!("{err}")),
        }
    }

    pub fn failure(status: &'static str, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            status,
            data: None,
            message: message.into(),
        }
    }

    pub fn from_repo_error(err: &RepoError) -> Self {
        Self::failure(status_for(err), err.to_string())
    }

    pub fn exit_code(&self) -> i32 {
        if self.ok {
            0
        } else {
            1
        }
    }
}

/// Boundary label for one engine failure.
pub fn status_for(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "invalid_request",
        RepoError::NotFound(_) => "not_found",
        RepoError::CapacityExceeded { .. } => "capacity_exceeded",
        RepoError::Db(_) | RepoError::InvalidData(_) => "storage_error",
    }
}

#[cfg(test)]
mod tests {
    use super::{status_for, CommandResponse};
    use serde_json::json;
    use staffing_core::{EntityRef, RepoError, ValidationError};

    #[test]
    fn failures_map_to_stable_labels() {
        let capacity = RepoError::CapacityExceeded {
            person_id: 1,
            requested: 40,
            available: 30,
        };
        assert_eq!(status_for(&capacity), "capacity_exceeded");
        assert_eq!(
            status_for(&RepoError::NotFound(EntityRef::Person(1))),
            "not_found"
        );
        assert_eq!(
            status_for(&RepoError::Validation(ValidationError::EffortOutOfRange(0))),
            "invalid_request"
        );
        assert_eq!(
            status_for(&RepoError::InvalidData("bad".to_string())),
            "storage_error"
        );
    }

    #[test]
    fn failure_envelope_omits_data_and_sets_exit_code() {
        let response =
            CommandResponse::from_repo_error(&RepoError::NotFound(EntityRef::Project(9)));
        assert_eq!(response.exit_code(), 1);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"ok": false, "status": "not_found", "message": "project 9 not found"})
        );
    }

    #[test]
    fn success_envelope_carries_data() {
        let response = CommandResponse::success("availability", json!({"availability": 30}));
        assert!(response.ok);
        assert_eq!(response.exit_code(), 0);
        assert_eq!(response.data.unwrap()["availability"], 30);
    }
}
