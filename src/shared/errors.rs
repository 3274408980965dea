use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation: {0}")]
    Validation(String),

    #[error("Identity mismatch: {field} in body is '{actual}', request addresses '{expected}'")]
    IdentityMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Whether the caller sent something the service refuses to store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DomainError::Validation(_) | DomainError::IdentityMismatch { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<InfraError> for DomainError {
    fn from(e: InfraError) -> Self {
        DomainError::Storage(e.to_string())
    }
}

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_payload_faults_are_client_errors() {
        assert!(DomainError::Validation("bad".into()).is_client_error());
        assert!(!DomainError::Storage("connection reset".into()).is_client_error());
        assert!(!DomainError::Unauthorized("no token".into()).is_client_error());
    }

    #[test]
    fn infra_errors_become_storage_errors() {
        let err: DomainError = InfraError::Database(sea_orm::DbErr::Custom("boom".into())).into();
        assert!(matches!(err, DomainError::Storage(ref msg) if msg.contains("boom")));
    }

    #[test]
    fn identity_mismatch_message_names_field() {
        let err = DomainError::IdentityMismatch {
            field: "party_id",
            expected: "ABC".into(),
            actual: "XYZ".into(),
        };
        assert!(err.is_client_error());
        assert_eq!(
            err.to_string(),
            "Identity mismatch: party_id in body is 'XYZ', request addresses 'ABC'"
        );
    }
}
