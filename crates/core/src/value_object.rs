//! Validated value objects: typed, immutable payloads built from loose input.
//!
//! Request bodies arrive as untyped JSON. Before anything reaches a resource
//! service it is deserialized into a `Raw` shape and then checked field by
//! field, producing a value that can no longer be invalid.

use serde::de::DeserializeOwned;

use crate::error::{DomainError, DomainResult};

/// A payload that has passed schema validation.
pub trait Validated: Sized {
    /// Loosely-typed input shape (usually all-optional fields).
    type Raw: DeserializeOwned;

    /// Check `raw` and build the validated value.
    fn validate(raw: Self::Raw) -> DomainResult<Self>;

    /// Deserialize a JSON body into `Raw`, then validate it.
    fn from_json(value: serde_json::Value) -> DomainResult<Self> {
        let raw: Self::Raw = serde_json::from_value(value)
            .map_err(|e| DomainError::validation(e.to_string()))?;
        Self::validate(raw)
    }
}

/// A required text field: present and non-blank (trimmed).
pub fn require_text(field: &str, value: Option<String>) -> DomainResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(DomainError::validation(format!("{field} is required"))),
    }
}

/// An optional text field; blank values collapse to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A patch of a required field: absent is fine, blank is not.
pub fn patch_text(field: &str, value: Option<String>) -> DomainResult<Option<String>> {
    match value {
        None => Ok(None),
        Some(v) => require_text(field, Some(v)).map(Some),
    }
}
