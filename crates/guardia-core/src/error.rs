// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Error taxonomy for the Guardia core.

use thiserror::Error;

/// Result type used across Guardia crates.
pub type GuardiaResult<T> = Result<T, GuardiaError>;

/// Errors reported synchronously to the caller of a lifecycle operation.
///
/// `Validation`, `InvalidState`, and `NotFound` always mean the attempted
/// mutation was not applied and no audit entry was appended.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardiaError {
    /// Invalid input (empty purpose set, missing mandatory purpose,
    /// under-length description, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// The target record is in a state that does not permit the operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The referenced artifact, grievance, or fiduciary does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The storage backend failed to persist a value.
    #[error("storage error: {0}")]
    Storage(String),

    /// A value could not be serialised or deserialised.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for GuardiaError {
    fn from(error: serde_json::Error) -> Self {
        GuardiaError::Serialization(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::GuardiaError;

    #[test]
    fn messages_carry_category_prefix() {
        let error = GuardiaError::InvalidState("artifact ART-1 is WITHDRAWN".into());
        assert_eq!(error.to_string(), "invalid state: artifact ART-1 is WITHDRAWN");
    }

    #[test]
    fn json_errors_convert_to_serialization() {
        let parse = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        let error: GuardiaError = parse.into();
        assert!(matches!(error, GuardiaError::Serialization(_)));
    }
}
