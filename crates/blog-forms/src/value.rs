//! Typed values produced by field cleaning.
//!
//! A cleaned form carries a [`Value`] per field. The set of variants is the
//! set of declared field types a blog form uses: text, a checkbox, and an
//! optional file upload.

use std::fmt;

use serde::Serialize;

use crate::data::UploadedFile;

/// A cleaned, typed field value.
///
/// # Examples
///
/// ```
/// use blog_forms::Value;
///
/// let v = Value::from("alice");
/// assert_eq!(v.as_str(), Some("alice"));
/// assert_eq!(Value::from(true).as_bool(), Some(true));
/// assert!(Value::Null.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// No value (an optional field left empty).
    Null,
    /// A checkbox state.
    Bool(bool),
    /// Text input, including secret and multi-line text.
    String(String),
    /// An uploaded file.
    File(UploadedFile),
}

impl Value {
    /// Returns `true` if this is [`Value::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string slice if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the file if this is a [`Value::File`].
    pub const fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(f) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "{s}"),
            Self::File(file) => write!(f, "{}", file.name),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<UploadedFile> for Value {
    fn from(v: UploadedFile) -> Self {
        Self::File(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
