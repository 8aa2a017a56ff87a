// Copyright 2025 Cowboy AI, LLC.

//! Status code value object

use crate::errors::{DomainError, DomainResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a status within a workflow
///
/// Status codes are value objects: two codes are equal iff their strings are
/// equal. Construction rejects empty or whitespace-only input.
///
/// # Examples
///
/// ```rust
/// use cim_domain_workflow::StatusCode;
///
/// let draft = StatusCode::new("draft").unwrap();
/// assert_eq!(draft.as_str(), "draft");
/// assert_eq!(draft, StatusCode::new("draft").unwrap());
/// assert!(StatusCode::new("  ").is_err());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(try_from = "String", into = "String")]
pub struct StatusCode(String);

impl StatusCode {
    /// Create a status code, validating that it is not blank
    pub fn new(value: impl Into<String>) -> DomainResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Status code cannot be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    /// Get the underlying string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for StatusCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for StatusCode {
    type Error = DomainError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StatusCode> for String {
    fn from(code: StatusCode) -> Self {
        code.0
    }
}

impl AsRef<str> for StatusCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code_equality_is_by_value() {
        let a = StatusCode::new("review").unwrap();
        let b = StatusCode::try_from("review").unwrap();
        let c = StatusCode::new("published").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_blank_status_code_is_rejected() {
        for blank in ["", " ", "\t\n"] {
            let err = StatusCode::new(blank).unwrap_err();
            assert!(err.is_validation_error());
        }
    }

    #[test]
    fn test_status_code_serializes_as_plain_string() {
        let code = StatusCode::new("draft").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"draft\"");

        let back: StatusCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);

        assert!(serde_json::from_str::<StatusCode>("\"\"").is_err());
    }
}
