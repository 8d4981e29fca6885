use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Payment declined: {0}")]
    PaymentDeclined(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: id.to_string(),
        }
    }

    /// Whether the caller may retry the same request (a lost race or an
    /// occupied window). The core itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DomainError::Conflict(_))
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::Validation(errors.to_string())
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(detail)) => {
                DomainError::AlreadyExists(detail)
            }
            _ => DomainError::Storage(e.to_string()),
        }
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_entity_and_id() {
        let err = DomainError::not_found("Booking", 42);
        assert_eq!(err.to_string(), "Not found: Booking with id=42");
    }

    #[test]
    fn only_conflicts_are_retryable() {
        assert!(DomainError::Conflict("window taken".into()).is_retryable());
        assert!(!DomainError::InvalidState("closed".into()).is_retryable());
        assert!(!DomainError::Storage("io".into()).is_retryable());
    }

    #[test]
    fn generic_db_error_maps_to_storage() {
        let err: DomainError = sea_orm::DbErr::Custom("connection reset".into()).into();
        assert!(matches!(err, DomainError::Storage(msg) if msg.contains("connection reset")));
    }
}
