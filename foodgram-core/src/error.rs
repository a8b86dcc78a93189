use thiserror::Error;

/// Field key used for errors that do not belong to a single request field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Every way a recipe, list or subscription operation can fail.
///
/// Each variant knows which request field it belongs to, so the HTTP layer can
/// render a field-keyed error map without inspecting messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("{field} contains duplicate value {value}")]
    DuplicateValue { field: &'static str, value: String },

    #[error("{field} references unknown ids {ids:?}")]
    UnknownReference { field: &'static str, ids: Vec<i32> },

    #[error("{field}: {message}")]
    InvalidFormat { field: &'static str, message: String },

    #[error("{field}: {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{message}")]
    Conflict {
        field: &'static str,
        message: String,
    },

    #[error("You cannot subscribe to yourself")]
    SelfReference,

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("{message}")]
    EmptyState {
        field: &'static str,
        message: String,
    },

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    /// The request field this error is reported under.
    pub fn field(&self) -> &'static str {
        match self {
            DomainError::MissingField { field }
            | DomainError::DuplicateValue { field, .. }
            | DomainError::UnknownReference { field, .. }
            | DomainError::InvalidFormat { field, .. }
            | DomainError::OutOfRange { field, .. }
            | DomainError::Conflict { field, .. }
            | DomainError::EmptyState { field, .. } => field,
            DomainError::SelfReference => "author",
            DomainError::NotFound { entity } => entity,
            DomainError::Storage(_) => NON_FIELD_ERRORS,
        }
    }

    /// True for failures the client caused, as opposed to backend outages.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, DomainError::Storage(_))
    }

    pub fn invalid_format(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::InvalidFormat {
            field,
            message: message.into(),
        }
    }

    pub fn conflict(field: &'static str, message: impl Into<String>) -> Self {
        DomainError::Conflict {
            field,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_keys() {
        assert_eq!(DomainError::MissingField { field: "tags" }.field(), "tags");
        assert_eq!(DomainError::SelfReference.field(), "author");
        assert_eq!(
            DomainError::NotFound { entity: "recipe" }.field(),
            "recipe"
        );
        assert_eq!(
            DomainError::Storage("down".to_string()).field(),
            NON_FIELD_ERRORS
        );
    }

    #[test]
    fn test_messages() {
        let err = DomainError::OutOfRange {
            field: "amount",
            value: 0,
            min: 1,
            max: i32::MAX as i64,
        };
        assert_eq!(err.to_string(), "amount: 0 is outside 1..=2147483647");
        assert!(err.is_client_error());
        assert!(!DomainError::Storage("x".to_string()).is_client_error());
    }
}
