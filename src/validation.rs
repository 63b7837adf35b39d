//! Payload validation support.
//!
//! Create/update schemas collect problems into a [`FieldErrors`] map, which is
//! also the wire shape of a 400 response: each offending field maps to the
//! list of messages raised against it, and payload-level problems land under
//! [`FieldErrors::NON_FIELD`].
//!
//! # Example
//!
//! ```rust,ignore
//! use scrud::validation::{validators, FieldErrors};
//!
//! let mut errors = FieldErrors::new();
//! if let Err(e) = validators::required("name", payload.name.as_deref()) {
//!     errors.push(e);
//! }
//! errors.into_result()?;
//! ```

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A single validation failure: the field it belongs to and its message.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    /// The field that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl FieldError {
    /// Create a new field error
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}

/// Field-name to message-list map, serialized verbatim as a 400 body.
///
/// A `BTreeMap` keeps the serialized field order stable.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq, utoipa::ToSchema)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Key for errors that do not belong to a single field.
    pub const NON_FIELD: &'static str = "non_field_errors";

    /// Create a new empty error map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a map holding a single payload-level error
    #[must_use]
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(Self::NON_FIELD, message);
        errors
    }

    /// Append a message to a field's error list
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Append a [`FieldError`]
    pub fn push(&mut self, error: FieldError) {
        self.add(error.field, error.message);
    }

    /// Check if there are any errors
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with at least one error
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Messages recorded against a field, if any
    #[must_use]
    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Convert to Result: `Ok(())` when empty, `Err(self)` otherwise
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed for {} field(s):", self.errors.len())?;
        for (field, messages) in &self.errors {
            write!(f, "\n  - {}: {}", field, messages.join("; "))?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        let mut errors = Self::new();
        for error in iter {
            errors.push(error);
        }
        errors
    }
}

impl From<FieldError> for FieldErrors {
    fn from(error: FieldError) -> Self {
        let mut errors = Self::new();
        errors.push(error);
        errors
    }
}

/// Payload deserialization failures become a payload-level error so that
/// every malformed body answers with the same 400 map shape.
impl From<serde_json::Error> for FieldErrors {
    fn from(error: serde_json::Error) -> Self {
        Self::non_field(format!("Invalid payload: {error}"))
    }
}

/// Helper validators for common schema rules
pub mod validators {
    use super::FieldError;

    /// Reject an absent value
    pub fn required<T>(field: &str, value: Option<T>) -> Result<T, FieldError> {
        value.ok_or_else(|| FieldError::new(field, "This field is required."))
    }

    /// Reject an empty or whitespace-only string
    pub fn not_blank(field: &str, value: &str) -> Result<(), FieldError> {
        if value.trim().is_empty() {
            return Err(FieldError::new(field, "This field may not be blank."));
        }
        Ok(())
    }

    /// Reject a string longer than `max` characters
    pub fn max_length(field: &str, value: &str, max: usize) -> Result<(), FieldError> {
        if value.chars().count() > max {
            return Err(FieldError::new(
                field,
                format!("Ensure this field has no more than {max} characters."),
            ));
        }
        Ok(())
    }

    /// Basic email shape check
    pub fn email(field: &str, value: &str) -> Result<(), FieldError> {
        if !value.contains('@') || !value.contains('.') {
            return Err(FieldError::new(field, "Enter a valid email address."));
        }
        max_length(field, value, 255)
    }
}
