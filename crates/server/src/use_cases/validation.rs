//! Common validation helpers for use cases.

/// Validation error type.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("{field_name} is required")]
    Missing { field_name: &'static str },

    #[error("{field_name} cannot be empty")]
    Empty { field_name: &'static str },

    #[error("{field_name} is invalid: {reason}")]
    Invalid {
        field_name: &'static str,
        reason: String,
    },
}

impl ValidationError {
    pub fn invalid(field_name: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field_name,
            reason: reason.into(),
        }
    }
}

/// Validate a string is non-empty after trimming.
pub fn require_non_empty(value: &str, field_name: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field_name });
    }
    Ok(())
}

/// Validate an optional value is present.
pub fn require_present<T>(
    value: Option<T>,
    field_name: &'static str,
) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::Missing { field_name })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_missing_are_distinct() {
        assert!(matches!(
            require_non_empty("  ", "sprite"),
            Err(ValidationError::Empty { .. })
        ));
        assert!(matches!(
            require_present::<i64>(None, "cp"),
            Err(ValidationError::Missing { .. })
        ));
        assert_eq!(require_present(Some(7), "cp").expect("present"), 7);
    }
}
