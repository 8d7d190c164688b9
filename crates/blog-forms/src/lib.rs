//! # blog-forms
//!
//! Forms framework for the blog. A form is an ordered list of
//! [`FormFieldDef`](fields::FormFieldDef)s plus an optional async
//! [`clean`](form::Form::clean) hook for checks that need external state.
//!
//! - [`data`] - Submitted input: text fields and uploaded files
//! - [`value`] - Typed, cleaned field values
//! - [`validators`] - Stock validators (length, equality, file extension)
//! - [`fields`] - Field definitions and per-field cleaning
//! - [`form`] - The [`Form`](form::Form) trait and [`BaseForm`](form::BaseForm)
//! - [`validation`] - The field-level pass and the [`full_clean`](validation::full_clean) entry point

pub mod data;
pub mod fields;
pub mod form;
pub mod validation;
pub mod validators;
pub mod value;

pub use data::{FormData, UploadedFile};
pub use fields::{FormFieldDef, FormFieldType};
pub use form::{BaseForm, CleanedData, ErrorMap, Form, NON_FIELD_ERRORS};
pub use validation::{full_clean, ValidationOutcome};
pub use value::Value;
