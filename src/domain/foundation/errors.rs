//! Error types shared across ports and domain services.

use thiserror::Error;

/// Errors surfaced by port implementations (repositories, transition
/// collaborators).
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// Underlying storage failed; the operation may succeed on retry.
    #[error("storage error: {0}")]
    Storage(String),

    /// A referenced entity does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A state transition was requested that the current state forbids.
    /// Expected under notification replay; callers decide whether to swallow.
    #[error("illegal transition: {0}")]
    IllegalTransition(String),
}

impl DomainError {
    pub fn storage(message: impl Into<String>) -> Self {
        DomainError::Storage(message.into())
    }

    pub fn not_found(entity: &'static str) -> Self {
        DomainError::NotFound { entity }
    }

    pub fn illegal_transition(message: impl Into<String>) -> Self {
        DomainError::IllegalTransition(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_displays_message() {
        let err = DomainError::storage("connection refused");
        assert_eq!(format!("{}", err), "storage error: connection refused");
    }

    #[test]
    fn not_found_names_entity() {
        let err = DomainError::not_found("payment request");
        assert_eq!(format!("{}", err), "payment request not found");
    }
}
