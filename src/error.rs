use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::domain::IdentityFailure;

/// Errors raised by the per-actor state layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("State serialization error: {0}")]
    Serialization(String),
    #[error("State backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        StateError::Serialization(err.to_string())
    }
}

/// Errors surfaced by actors, index services and stores.
///
/// Failures raised inside an actor travel unchanged through its mailbox back to
/// the caller; only mailbox failures are turned into `ActorCommunication`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("{operation} failed: {entity} '{id}' not found")]
    NotFound {
        operation: &'static str,
        entity: &'static str,
        id: String,
    },
    #[error("{actor_type} id '{actor_id}' does not match {entity} id '{payload_id}'")]
    IdMismatch {
        actor_type: &'static str,
        actor_id: String,
        entity: &'static str,
        payload_id: String,
    },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Operation cancelled")]
    Cancelled,
    #[error(transparent)]
    State(#[from] StateError),
    #[error("Actor communication error: {0}")]
    ActorCommunication(String),
    /// A store refused a write the operation depends on.
    #[error("Rejected: {}", .0.iter().map(|f| f.code).collect::<Vec<_>>().join(", "))]
    Rejected(Vec<IdentityFailure>),
}

impl IdentityError {
    pub fn user_not_found(operation: &'static str, id: impl Into<String>) -> Self {
        IdentityError::NotFound {
            operation,
            entity: "User",
            id: id.into(),
        }
    }

    pub fn role_not_found(operation: &'static str, id: impl Into<String>) -> Self {
        IdentityError::NotFound {
            operation,
            entity: "Role",
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, IdentityError::NotFound { .. })
    }
}

pub type Result<T, E = IdentityError> = std::result::Result<T, E>;

/// Rejects blank required arguments.
pub fn require_non_blank(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(IdentityError::InvalidArgument(format!("{name} must not be empty")));
    }
    Ok(())
}

/// Fails with `Cancelled` once the token has fired.
pub fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(IdentityError::Cancelled);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_blank() {
        assert!(require_non_blank("user", "name").is_ok());
        assert_eq!(
            require_non_blank("  ", "name"),
            Err(IdentityError::InvalidArgument("name must not be empty".to_string()))
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = IdentityError::user_not_found("Update", "u1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Update failed: User 'u1' not found");
    }

    #[test]
    fn test_rejected_message_lists_codes() {
        let err = IdentityError::Rejected(vec![IdentityFailure::duplicate_email("a@x.com")]);
        assert_eq!(err.to_string(), "Rejected: DuplicateEmail");
    }

    #[test]
    fn test_cancelled_token() {
        let cancel = CancellationToken::new();
        assert!(ensure_not_cancelled(&cancel).is_ok());
        cancel.cancel();
        assert_eq!(ensure_not_cancelled(&cancel), Err(IdentityError::Cancelled));
    }
}
