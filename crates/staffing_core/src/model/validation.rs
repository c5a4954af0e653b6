//! Write-side validation errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lowest accepted effort or capacity percentage.
pub const MIN_PERCENT: i64 = 1;
/// Highest accepted effort or capacity percentage.
pub const MAX_PERCENT: i64 = 100;

/// Malformed caller input rejected before any state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field is empty after trimming.
    BlankField(&'static str),
    /// Effort percentage outside `(0, 100]`.
    EffortOutOfRange(i64),
    /// Base capacity outside `[1, 100]`.
    CapacityOutOfRange(i64),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be empty"),
            Self::EffortOutOfRange(value) => write!(
                f,
                "effort percentage must be within ({}, {MAX_PERCENT}], got {value}",
                MIN_PERCENT - 1
            ),
            Self::CapacityOutOfRange(value) => write!(
                f,
                "base capacity must be within [{MIN_PERCENT}, {MAX_PERCENT}], got {value}"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn require_text<'a>(
    field: &'static str,
    value: &'a str,
) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(trimmed)
}

/// Narrows a raw percentage into `[1, 100]`, mapping failures through `err`.
pub(crate) fn require_percent(
    value: i64,
    err: fn(i64) -> ValidationError,
) -> Result<u8, ValidationError> {
    if !(MIN_PERCENT..=MAX_PERCENT).contains(&value) {
        return Err(err(value));
    }
    u8::try_from(value).map_err(|_| err(value))
}

#[cfg(test)]
mod tests {
    use super::{require_percent, require_text, ValidationError};

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("person.name", "  Ada ").unwrap(), "Ada");
        assert_eq!(
            require_text("person.name", " \t").unwrap_err(),
            ValidationError::BlankField("person.name")
        );
    }

    #[test]
    fn require_percent_accepts_bounds_only() {
        assert_eq!(require_percent(1, ValidationError::EffortOutOfRange), Ok(1));
        assert_eq!(require_percent(100, ValidationError::EffortOutOfRange), Ok(100));
        assert_eq!(
            require_percent(0, ValidationError::EffortOutOfRange),
            Err(ValidationError::EffortOutOfRange(0))
        );
        assert_eq!(
            require_percent(101, ValidationError::CapacityOutOfRange),
            Err(ValidationError::CapacityOutOfRange(101))
        );
    }

    #[test]
    fn effort_message_names_open_lower_bound() {
        let message = ValidationError::EffortOutOfRange(-5).to_string();
        assert!(message.contains("(0, 100]"));
        assert!(message.contains("-5"));
    }
}
