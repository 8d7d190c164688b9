//! Validation pipeline for form processing.
//!
//! 1. Field-level validation (type coercion + per-field validators)
//! 2. Form-level validation through [`Form::clean`] (async, may hit the user store)
//!
//! Field errors accumulate rather than short-circuiting, so every field that
//! fails is reported in one pass.

use std::collections::HashMap;

use blog_core::{BlogError, BlogResult};
use serde::Serialize;

use crate::data::UploadedFile;
use crate::fields::{clean_field_value, FormFieldDef, RawData};
use crate::form::{CleanedData, ErrorMap, Form};
use crate::value::Value;

/// Mask written in place of secret values by [`ValidationOutcome::redacted`].
pub const REDACTED: &str = "********";

/// Performs field-level validation for all fields.
///
/// Populates `cleaned_data` on success or `errors` on failure, per field.
pub fn clean_fields(
    field_defs: &[FormFieldDef],
    raw_data: &RawData,
    raw_files: &HashMap<String, UploadedFile>,
    cleaned_data: &mut CleanedData,
    errors: &mut ErrorMap,
) {
    for field in field_defs {
        let raw = raw_data.get(&field.name).and_then(|v| v.as_deref());
        let file = raw_files.get(&field.name);

        match clean_field_value(field, raw, file, raw_data) {
            Ok(value) => {
                cleaned_data.insert(field.name.clone(), value);
            }
            Err(field_errors) => {
                errors.insert(field.name.clone(), field_errors);
            }
        }
    }
}

/// Result of one full validation pass.
///
/// Serializes as `{"status": "accepted", "cleaned_data": {...}}` or
/// `{"status": "rejected", "errors": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// Every field passed.
    Accepted {
        /// Typed values per field.
        cleaned_data: CleanedData,
    },
    /// At least one field failed.
    Rejected {
        /// Messages per failing field.
        errors: ErrorMap,
    },
}

impl ValidationOutcome {
    /// Returns `true` for [`ValidationOutcome::Accepted`].
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Returns the messages for a field, or an empty slice.
    pub fn errors_for(&self, field: &str) -> &[String] {
        match self {
            Self::Rejected { errors } => errors.get(field).map(Vec::as_slice).unwrap_or_default(),
            Self::Accepted { .. } => &[],
        }
    }

    /// Returns a copy with the values of secret fields masked.
    #[must_use]
    pub fn redacted(&self, fields: &[FormFieldDef]) -> Self {
        match self {
            Self::Accepted { cleaned_data } => {
                let mut cleaned_data = cleaned_data.clone();
                for field in fields.iter().filter(|f| f.field_type.is_secret()) {
                    if let Some(value) = cleaned_data.get_mut(&field.name) {
                        if !value.is_null() {
                            *value = Value::from(REDACTED);
                        }
                    }
                }
                Self::Accepted { cleaned_data }
            }
            Self::Rejected { .. } => self.clone(),
        }
    }
}

/// Validates an already-bound form and packages the result.
///
/// # Errors
///
/// Returns [`BlogError::BadRequest`] if the form was never bound, and
/// propagates any storage failure raised by [`Form::clean`].
pub async fn full_clean<F>(form: &mut F, ctx: &F::Context) -> BlogResult<ValidationOutcome>
where
    F: Form + ?Sized,
{
    if !form.is_bound() {
        return Err(BlogError::BadRequest(format!(
            "form '{}' has no submitted data",
            form.base().name()
        )));
    }

    if form.is_valid(ctx).await? {
        Ok(ValidationOutcome::Accepted {
            cleaned_data: form.cleaned_data().clone(),
        })
    } else {
        Ok(ValidationOutcome::Rejected {
            errors: form.errors().clone(),
        })
    }
}
