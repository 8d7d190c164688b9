//! Form trait and `BaseForm` implementation.
//!
//! [`BaseForm`] holds the field definitions and the per-submission state:
//! bound raw input, per-field errors, and cleaned values. Concrete forms wrap
//! a `BaseForm` and implement [`Form`], overriding [`Form::clean`] when a
//! check needs something outside the submission (a user-record lookup, the
//! current session identity). Those collaborators arrive through the form's
//! [`Form::Context`] on every validation call.
//!
//! A form moves UNBOUND → BOUND on [`Form::bind`] and UNVALIDATED → VALIDATED
//! on [`Form::is_valid`]. Binding again resets both.

use std::collections::HashMap;

use async_trait::async_trait;
use blog_core::{BlogError, BlogResult};
use tracing::Instrument;

use crate::data::{FormData, UploadedFile};
use crate::fields::{FormFieldDef, RawData};
use crate::validation;
use crate::value::Value;

/// Per-field error messages, keyed by field name.
pub type ErrorMap = HashMap<String, Vec<String>>;

/// Cleaned values, keyed by field name.
pub type CleanedData = HashMap<String, Value>;

/// Error-map key for errors that belong to no single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// The core form trait.
///
/// Validation is async because [`clean`](Form::clean) may consult an
/// external store. A storage failure surfaces as `Err` from
/// [`is_valid`](Form::is_valid); it is never folded into the error map.
#[async_trait]
pub trait Form: Send + Sync {
    /// Explicit collaborators needed by [`clean`](Form::clean).
    type Context: Sync + ?Sized;

    /// Returns the wrapped base form.
    fn base(&self) -> &BaseForm;

    /// Returns the wrapped base form mutably.
    fn base_mut(&mut self) -> &mut BaseForm;

    /// Checks that need state beyond the submission.
    ///
    /// Runs after field cleaning and sees only the fields that passed it.
    /// Returns the extra per-field errors to merge. The default does nothing.
    async fn clean(&self, _ctx: &Self::Context) -> BlogResult<ErrorMap> {
        Ok(ErrorMap::new())
    }

    /// Binds submitted data to this form.
    fn bind(&mut self, data: &FormData) {
        self.base_mut().bind(data);
    }

    /// Returns `true` if this form has been bound to data.
    fn is_bound(&self) -> bool {
        self.base().is_bound()
    }

    /// Runs field cleaning, then [`clean`](Form::clean).
    ///
    /// Returns `Ok(false)` for an unbound form. After this call,
    /// [`errors`](Form::errors) and [`cleaned_data`](Form::cleaned_data)
    /// describe the submission.
    async fn is_valid(&mut self, ctx: &Self::Context) -> BlogResult<bool> {
        if !self.base().is_bound() {
            return Ok(false);
        }

        let span = blog_core::logging::form_span(self.base().name());
        async move {
            self.base_mut().clean_fields();
            let extra = self.clean(ctx).await?;
            let base = self.base_mut();
            base.merge_errors(extra);
            base.validated = true;

            let valid = base.errors.is_empty();
            if valid {
                tracing::debug!(fields = base.field_defs.len(), "form accepted");
            } else {
                let mut rejected: Vec<&str> = base.errors.keys().map(String::as_str).collect();
                rejected.sort_unstable();
                tracing::debug!(?rejected, "form rejected");
            }
            Ok::<_, BlogError>(valid)
        }
        .instrument(span)
        .await
    }

    /// Returns per-field validation errors.
    fn errors(&self) -> &ErrorMap {
        self.base().errors()
    }

    /// Returns the cleaned values of the fields that passed.
    fn cleaned_data(&self) -> &CleanedData {
        self.base().cleaned_data()
    }

    /// Returns the form's field definitions.
    fn fields(&self) -> &[FormFieldDef] {
        self.base().fields()
    }
}

/// A general-purpose form.
///
/// Implements [`Form`] itself with a unit context and no extra checks, which
/// is enough for purely structural forms.
#[derive(Debug)]
pub struct BaseForm {
    name: String,
    field_defs: Vec<FormFieldDef>,
    prefix: Option<String>,
    bound: bool,
    validated: bool,
    raw_data: RawData,
    raw_files: HashMap<String, UploadedFile>,
    errors: ErrorMap,
    cleaned_data: CleanedData,
}

impl BaseForm {
    /// Creates a new, unbound form named `name` with the given fields.
    pub fn new(name: impl Into<String>, fields: Vec<FormFieldDef>) -> Self {
        Self {
            name: name.into(),
            field_defs: fields,
            prefix: None,
            bound: false,
            validated: false,
            raw_data: RawData::new(),
            raw_files: HashMap::new(),
            errors: ErrorMap::new(),
            cleaned_data: CleanedData::new(),
        }
    }

    /// Sets the prefix used to namespace input names (`{prefix}-{field}`).
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Returns the form name used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the input-name prefix.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns the field definitions.
    pub fn fields(&self) -> &[FormFieldDef] {
        &self.field_defs
    }

    /// Binds submitted data, resetting any previous validation state.
    pub fn bind(&mut self, data: &FormData) {
        self.bound = true;
        self.validated = false;
        self.raw_data.clear();
        self.raw_files.clear();
        self.errors.clear();
        self.cleaned_data.clear();

        for field in &self.field_defs {
            let html_name = match &self.prefix {
                Some(p) => format!("{p}-{}", field.name),
                None => field.name.clone(),
            };
            self.raw_data
                .insert(field.name.clone(), data.get(&html_name).map(String::from));
            if let Some(file) = data.file(&html_name) {
                self.raw_files.insert(field.name.clone(), file.clone());
            }
        }
    }

    /// Returns `true` if this form has been bound to data.
    pub const fn is_bound(&self) -> bool {
        self.bound
    }

    /// Returns `true` once a validation pass has completed for the current binding.
    pub const fn is_validated(&self) -> bool {
        self.validated
    }

    /// Returns `true` if the last validation pass accepted every field.
    pub fn is_accepted(&self) -> bool {
        self.validated && self.errors.is_empty()
    }

    /// Runs the field-level pass over the bound input.
    pub fn clean_fields(&mut self) {
        self.errors.clear();
        self.cleaned_data.clear();
        validation::clean_fields(
            &self.field_defs,
            &self.raw_data,
            &self.raw_files,
            &mut self.cleaned_data,
            &mut self.errors,
        );
    }

    /// Adds an error to a field (or to [`NON_FIELD_ERRORS`]).
    ///
    /// The field's cleaned value, if any, is dropped.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.cleaned_data.remove(field);
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Merges a map of extra errors into this form.
    pub fn merge_errors(&mut self, extra: ErrorMap) {
        for (field, messages) in extra {
            for message in messages {
                self.add_error(&field, message);
            }
        }
    }

    /// Returns per-field errors.
    pub const fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Returns the errors attached to no single field.
    pub fn non_field_errors(&self) -> &[String] {
        self.errors
            .get(NON_FIELD_ERRORS)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the cleaned values.
    pub const fn cleaned_data(&self) -> &CleanedData {
        &self.cleaned_data
    }

    /// Returns the raw submitted text for a field, if any was bound.
    pub fn raw_value(&self, field: &str) -> Option<&str> {
        self.raw_data.get(field).and_then(Option::as_deref)
    }

    /// Returns a cleaned text value.
    pub fn cleaned_str(&self, field: &str) -> Option<&str> {
        self.cleaned_data.get(field).and_then(Value::as_str)
    }

    /// Returns a cleaned checkbox value.
    pub fn cleaned_bool(&self, field: &str) -> Option<bool> {
        self.cleaned_data.get(field).and_then(Value::as_bool)
    }

    /// Returns a cleaned file upload.
    pub fn cleaned_file(&self, field: &str) -> Option<&UploadedFile> {
        self.cleaned_data.get(field).and_then(Value::as_file)
    }
}

#[async_trait]
impl Form for BaseForm {
    type Context = ();

    fn base(&self) -> &BaseForm {
        self
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FormFieldType;
    use crate::validators::{EqualTo, Length};

    fn make_test_form() -> BaseForm {
        BaseForm::new(
            "signup",
            vec![
                FormFieldDef::new("username", FormFieldType::Text { strip: true })
                    .validator(Length::between(3, 25)),
                FormFieldDef::new("email", FormFieldType::Email),
                FormFieldDef::new("password", FormFieldType::Password),
                FormFieldDef::new("confirm_password", FormFieldType::Password)
                    .validator(EqualTo::new("password")),
                FormFieldDef::new("remember", FormFieldType::Boolean).required(false),
            ],
        )
    }

    #[tokio::test]
    async fn test_form_unbound() {
        let mut form = make_test_form();
        assert!(!form.is_bound());
        assert!(!form.is_valid(&()).await.unwrap());
        assert!(!form.is_validated());
    }

    #[tokio::test]
    async fn test_form_bind_and_validate() {
        let mut form = make_test_form();
        form.bind(&FormData::parse(
            "username=alice&email=alice@example.com&password=p1&confirm_password=p1&remember=y",
        ));
        assert!(form.is_bound());
        assert!(form.is_valid(&()).await.unwrap());
        assert!(form.is_accepted());
        assert_eq!(form.cleaned_str("username"), Some("alice"));
        assert_eq!(form.cleaned_bool("remember"), Some(true));
    }

    #[tokio::test]
    async fn test_form_errors_accumulate_across_fields() {
        let mut form = make_test_form();
        form.bind(&FormData::parse("username=ab&email=nope&password=p1&confirm_password=p2"));
        assert!(!form.is_valid(&()).await.unwrap());
        let errors = form.errors();
        assert!(errors.contains_key("username"));
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("confirm_password"));
        assert!(!errors.contains_key("password"));
        assert!(form.is_validated());
        assert!(!form.is_accepted());
    }

    #[tokio::test]
    async fn test_form_optional_checkbox_defaults_false() {
        let mut form = make_test_form();
        form.bind(&FormData::parse(
            "username=alice&email=alice@example.com&password=p1&confirm_password=p1",
        ));
        assert!(form.is_valid(&()).await.unwrap());
        assert_eq!(form.cleaned_bool("remember"), Some(false));
    }

    #[tokio::test]
    async fn test_form_with_prefix() {
        let mut form = make_test_form().with_prefix("reg");
        assert_eq!(form.prefix(), Some("reg"));
        form.bind(&FormData::parse(
            "reg-username=alice&reg-email=alice@example.com&reg-password=p1&reg-confirm_password=p1",
        ));
        assert!(form.is_valid(&()).await.unwrap());
    }

    #[tokio::test]
    async fn test_form_rebind_clears_state() {
        let mut form = make_test_form();
        form.bind(&FormData::parse("username=ab"));
        assert!(!form.is_valid(&()).await.unwrap());
        assert!(!form.errors().is_empty());

        form.bind(&FormData::parse(
            "username=alice&email=alice@example.com&password=p1&confirm_password=p1",
        ));
        assert!(form.errors().is_empty());
        assert!(!form.is_validated());
        assert!(form.is_valid(&()).await.unwrap());
    }

    #[test]
    fn test_add_error_drops_cleaned_value() {
        let mut form = make_test_form();
        form.bind(&FormData::parse("username=alice"));
        form.clean_fields();
        assert_eq!(form.cleaned_str("username"), Some("alice"));
        form.add_error("username", "taken");
        assert_eq!(form.cleaned_str("username"), None);
        assert_eq!(form.errors()["username"], vec!["taken".to_string()]);
    }

    #[test]
    fn test_non_field_errors() {
        let mut form = make_test_form();
        assert!(form.non_field_errors().is_empty());
        form.add_error(NON_FIELD_ERRORS, "Something went wrong.");
        assert_eq!(form.non_field_errors(), ["Something went wrong.".to_string()]);
    }

    #[test]
    fn test_raw_value() {
        let mut form = make_test_form();
        form.bind(&FormData::parse("username=+alice+"));
        assert_eq!(form.raw_value("username"), Some(" alice "));
        assert_eq!(form.raw_value("email"), None);
    }

    #[test]
    fn test_form_fields() {
        let form = make_test_form();
        assert_eq!(form.name(), "signup");
        let names: Vec<&str> = Form::fields(&form).iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            ["username", "email", "password", "confirm_password", "remember"]
        );
    }
}
