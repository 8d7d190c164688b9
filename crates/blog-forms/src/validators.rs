//! Stock field validators.
//!
//! A [`Validator`] checks one constraint on an already type-coerced value.
//! Validators that compare against a sibling field (see [`EqualTo`]) read the
//! sibling's raw submitted text from the form's [`RawData`].
//!
//! Presence ("required") and email syntax are handled by the field definition
//! and its declared type rather than by validators here.

use std::fmt;

use blog_core::ValidationError;

use crate::fields::RawData;
use crate::value::Value;

/// A reusable, stateless check over one field value.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use blog_forms::validators::{Length, Validator};
/// use blog_forms::Value;
///
/// let v = Length::between(3, 25);
/// let raw = HashMap::new();
/// assert!(v.validate(&Value::from("alice"), &raw).is_ok());
/// assert!(v.validate(&Value::from("al"), &raw).is_err());
/// ```
pub trait Validator: Send + Sync + fmt::Debug {
    /// Validates the given value, returning the rejection reason if invalid.
    fn validate(&self, value: &Value, raw: &RawData) -> Result<(), ValidationError>;

    /// Returns a human-readable name for this validator.
    fn name(&self) -> &str;
}

/// Validates the character count of a text value.
#[derive(Debug, Clone)]
pub struct Length {
    /// Minimum number of characters, inclusive.
    pub min: Option<usize>,
    /// Maximum number of characters, inclusive.
    pub max: Option<usize>,
    message: Option<String>,
}

impl Length {
    /// Accepts between `min` and `max` characters, inclusive.
    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
            message: None,
        }
    }

    /// Accepts at least `min` characters.
    pub const fn at_least(min: usize) -> Self {
        Self {
            min: Some(min),
            max: None,
            message: None,
        }
    }

    /// Accepts at most `max` characters.
    pub const fn at_most(max: usize) -> Self {
        Self {
            min: None,
            max: Some(max),
            message: None,
        }
    }

    /// Replaces the default message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn default_message(&self) -> String {
        match (self.min, self.max) {
            (Some(min), Some(max)) => {
                format!("Field must be between {min} and {max} characters long.")
            }
            (Some(min), None) => format!("Field must be at least {min} characters long."),
            (None, Some(max)) => format!("Field cannot be longer than {max} characters."),
            (None, None) => "Invalid field length.".to_string(),
        }
    }
}

impl Validator for Length {
    fn validate(&self, value: &Value, _raw: &RawData) -> Result<(), ValidationError> {
        let Some(s) = value.as_str() else {
            return Ok(());
        };
        let len = s.chars().count();
        let too_short = self.min.is_some_and(|min| len < min);
        let too_long = self.max.is_some_and(|max| len > max);
        if too_short || too_long {
            let message = self
                .message
                .clone()
                .unwrap_or_else(|| self.default_message());
            let mut err =
                ValidationError::new(message, "length").with_param("length", len.to_string());
            if let Some(min) = self.min {
                err = err.with_param("min", min.to_string());
            }
            if let Some(max) = self.max {
                err = err.with_param("max", max.to_string());
            }
            return Err(err);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "Length"
    }
}

/// Validates that a value equals the raw submitted value of another field.
///
/// Used for "confirm password" fields. The comparison is exact; an absent
/// sibling compares as the empty string.
#[derive(Debug, Clone)]
pub struct EqualTo {
    /// Name of the field to compare against.
    pub other: String,
    message: Option<String>,
}

impl EqualTo {
    /// Compares against the field named `other`.
    pub fn new(other: impl Into<String>) -> Self {
        Self {
            other: other.into(),
            message: None,
        }
    }

    /// Replaces the default `Field must be equal to {other}.` message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Validator for EqualTo {
    fn validate(&self, value: &Value, raw: &RawData) -> Result<(), ValidationError> {
        let other = raw
            .get(&self.other)
            .and_then(Option::as_deref)
            .unwrap_or("");
        let own = value.as_str().unwrap_or("");
        if own == other {
            return Ok(());
        }
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("Field must be equal to {}.", self.other));
        Err(ValidationError::new(message, "equal_to").with_param("other", self.other.clone()))
    }

    fn name(&self) -> &str {
        "EqualTo"
    }
}

/// Validates that an uploaded file has one of the allowed extensions.
///
/// Extensions are compared case-insensitively. Non-file values (an optional
/// upload left empty) pass.
#[derive(Debug, Clone)]
pub struct FileAllowed {
    /// Allowed extensions, lowercase, without the dot.
    pub extensions: Vec<String>,
    message: Option<String>,
}

impl FileAllowed {
    /// Allows the given extensions.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
            message: None,
        }
    }

    /// Replaces the default message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Validator for FileAllowed {
    fn validate(&self, value: &Value, _raw: &RawData) -> Result<(), ValidationError> {
        let Some(file) = value.as_file() else {
            return Ok(());
        };
        let allowed = file
            .extension()
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext));
        if allowed {
            return Ok(());
        }
        let message = self.message.clone().unwrap_or_else(|| {
            format!(
                "File does not have an approved extension: {}",
                self.extensions.join(", ")
            )
        });
        Err(ValidationError::new(message, "file_extension")
            .with_param("filename", file.name.clone()))
    }

    fn name(&self) -> &str {
        "FileAllowed"
    }
}
