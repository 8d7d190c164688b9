//! Core error types for the blog form layer.
//!
//! Two kinds of failure exist and they never mix:
//!
//! - [`ValidationError`] is a value describing why one submitted field was
//!   rejected. It is collected into per-field message lists and re-displayed.
//! - [`BlogError`] is a real failure (storage unreachable, bad configuration,
//!   IO) that aborts the request and propagates to the caller.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// A single rejected-field reason.
///
/// The `code` identifies the kind of failure (`"required"`, `"length"`,
/// `"invalid_email"`, `"equal_to"`, `"file_extension"`) so callers can
/// branch on it without parsing messages.
///
/// # Examples
///
/// ```
/// use blog_core::error::ValidationError;
///
/// let err = ValidationError::new("This field is required.", "required");
/// assert_eq!(err.to_string(), "This field is required.");
/// assert_eq!(err.code, "required");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The human-readable message shown next to the field.
    pub message: String,
    /// A short code identifying the type of validation failure.
    pub code: String,
    /// Additional parameters providing context for the message.
    pub params: HashMap<String, String>,
}

impl ValidationError {
    /// Creates a new `ValidationError` with a message and code.
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            params: HashMap::new(),
        }
    }

    /// Adds a parameter to this validation error.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// The primary error type for the blog form layer.
///
/// Field-level rejections are *not* represented here; they live in a form's
/// error map. A `BlogError` means the validation pass itself could not finish.
#[derive(Error, Debug)]
pub enum BlogError {
    /// The submitted request was malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The caller is not allowed to perform the action.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A looked-up object does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The user-record store could not be reached.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A generic database error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A storage uniqueness constraint was violated.
    #[error("Integrity error: {0}")]
    IntegrityError(String),

    /// Validation failed outside of a form pass (e.g. a CLI argument).
    #[error("Validation error: {0}")]
    ValidationError(ValidationError),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A potentially malicious or contract-breaking operation was attempted.
    #[error("Suspicious operation: {0}")]
    SuspiciousOperation(String),
}

impl BlogError {
    /// Returns the HTTP status code a request handler should answer with.
    ///
    /// - `BadRequest`, `ValidationError` -> 400
    /// - `PermissionDenied`, `SuspiciousOperation` -> 403
    /// - `NotFound` -> 404
    /// - `IntegrityError` -> 409
    /// - `StorageUnavailable` -> 503
    /// - Everything else -> 500
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::ValidationError(_) => 400,
            Self::PermissionDenied(_) | Self::SuspiciousOperation(_) => 403,
            Self::NotFound(_) => 404,
            Self::IntegrityError(_) => 409,
            Self::StorageUnavailable(_) => 503,
            Self::DatabaseError(_) | Self::ConfigurationError(_) | Self::IoError(_) => 500,
        }
    }
}

impl From<ValidationError> for BlogError {
    fn from(err: ValidationError) -> Self {
        Self::ValidationError(err)
    }
}

/// A convenience type alias for `Result<T, BlogError>`.
pub type BlogResult<T> = Result<T, BlogError>;
