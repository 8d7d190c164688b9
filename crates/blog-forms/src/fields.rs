//! Form field definitions and per-field cleaning.
//!
//! Each [`FormFieldDef`] describes a single form field: its declared type,
//! whether it is required, and its ordered validators. [`clean_field_value`]
//! turns the submitted input for one field into a typed [`Value`] or the
//! message of the first check that rejected it.

use std::collections::HashMap;

use blog_core::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::UploadedFile;
use crate::validators::Validator;
use crate::value::Value;

/// Raw submitted text per field name, as bound to a form.
pub type RawData = HashMap<String, Option<String>>;

// Dot-atom local part over RFC 5322 atext; domain labels are non-empty and
// never begin or end with a hyphen.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*",
        r"@(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$",
    ))
    .expect("valid regex")
});

/// The declared type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFieldType {
    /// Single-line text.
    Text {
        /// Whether to strip leading/trailing whitespace.
        strip: bool,
    },
    /// Secret text. Never stripped.
    Password,
    /// Multi-line text.
    TextArea {
        /// Whether to strip leading/trailing whitespace.
        strip: bool,
    },
    /// An email address; syntax is checked during coercion.
    Email,
    /// A checkbox. Absent means `false`.
    Boolean,
    /// A file upload.
    File,
}

impl FormFieldType {
    /// Returns `true` for fields whose value must not be echoed back or logged.
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::Password)
    }
}

/// Complete definition of a form field.
#[derive(Debug)]
pub struct FormFieldDef {
    /// The field name (HTML name attribute).
    pub name: String,
    /// Human-readable label.
    pub label: String,
    /// The declared type, controlling coercion.
    pub field_type: FormFieldType,
    /// Whether this field must be filled in.
    pub required: bool,
    /// Validators applied in order after coercion.
    pub validators: Vec<Box<dyn Validator>>,
    /// Custom error messages keyed by error code.
    pub error_messages: HashMap<String, String>,
}

impl FormFieldDef {
    /// Creates a new required `FormFieldDef` with no validators.
    ///
    /// The label defaults to the name with underscores replaced by spaces.
    pub fn new(name: impl Into<String>, field_type: FormFieldType) -> Self {
        let name = name.into();
        let label = name.replace('_', " ");
        Self {
            name,
            label,
            field_type,
            required: true,
            validators: Vec::new(),
            error_messages: HashMap::new(),
        }
    }

    /// Sets whether this field is required.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Appends a validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    /// Sets a custom error message for a given code.
    #[must_use]
    pub fn error_message(mut self, code: impl Into<String>, msg: impl Into<String>) -> Self {
        self.error_messages.insert(code.into(), msg.into());
        self
    }

    fn message_for(&self, err: ValidationError) -> String {
        self.error_messages
            .get(&err.code)
            .cloned()
            .unwrap_or(err.message)
    }
}

/// Cleans the submitted input for one field.
///
/// 1. Required check: missing text, whitespace-only text, an unchecked
///    required checkbox, or a missing file fails with the `required` message.
/// 2. Optional and empty: returns the empty value for the type
///    (`Null`, or `Bool(false)` for checkboxes) without running validators.
/// 3. Type coercion (email syntax is checked here).
/// 4. Validators in declaration order; the first failure ends the field.
///
/// Returns the cleaned `Value` or the rejection messages.
pub fn clean_field_value(
    field: &FormFieldDef,
    raw: Option<&str>,
    file: Option<&UploadedFile>,
    siblings: &RawData,
) -> Result<Value, Vec<String>> {
    let value = match coerce(field, raw, file) {
        Ok(Some(value)) => value,
        Ok(None) => return Ok(empty_value(field.field_type)),
        Err(err) => return Err(vec![field.message_for(err)]),
    };

    for validator in &field.validators {
        if let Err(err) = validator.validate(&value, siblings) {
            return Err(vec![field.message_for(err)]);
        }
    }

    Ok(value)
}

/// Coerces raw input into a typed value.
///
/// `Ok(None)` means the field is empty and optional.
fn coerce(
    field: &FormFieldDef,
    raw: Option<&str>,
    file: Option<&UploadedFile>,
) -> Result<Option<Value>, ValidationError> {
    let required = || ValidationError::new("This field is required.", "required");

    match field.field_type {
        FormFieldType::Boolean => {
            let checked = raw.is_some_and(|s| {
                matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on" | "y")
            });
            if field.required && !checked {
                return Err(required());
            }
            Ok(Some(Value::Bool(checked)))
        }
        FormFieldType::File => match file {
            Some(f) if !f.name.is_empty() => Ok(Some(Value::File(f.clone()))),
            _ if field.required => Err(required()),
            _ => Ok(None),
        },
        FormFieldType::Text { strip } | FormFieldType::TextArea { strip } => {
            let Some(s) = present(raw) else {
                return if field.required { Err(required()) } else { Ok(None) };
            };
            let s = if strip { s.trim() } else { s };
            Ok(Some(Value::String(s.to_string())))
        }
        FormFieldType::Password => {
            let Some(s) = present(raw) else {
                return if field.required { Err(required()) } else { Ok(None) };
            };
            Ok(Some(Value::String(s.to_string())))
        }
        FormFieldType::Email => {
            let Some(s) = present(raw) else {
                return if field.required { Err(required()) } else { Ok(None) };
            };
            let s = s.trim();
            if EMAIL_RE.is_match(s) {
                Ok(Some(Value::String(s.to_string())))
            } else {
                Err(ValidationError::new("Invalid email address.", "invalid_email"))
            }
        }
    }
}

/// Returns the raw text if it carries any non-whitespace content.
fn present(raw: Option<&str>) -> Option<&str> {
    raw.filter(|s| !s.trim().is_empty())
}

const fn empty_value(field_type: FormFieldType) -> Value {
    match field_type {
        FormFieldType::Boolean => Value::Bool(false),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{EqualTo, FileAllowed, Length};

    fn text(name: &str) -> FormFieldDef {
        FormFieldDef::new(name, FormFieldType::Text { strip: true })
    }

    fn no_siblings() -> RawData {
        RawData::new()
    }

    #[test]
    fn test_text_clean_strips() {
        let field = text("username");
        let result = clean_field_value(&field, Some("  alice  "), None, &no_siblings());
        assert_eq!(result, Ok(Value::from("alice")));
    }

    #[test]
    fn test_text_required_missing() {
        let field = text("username");
        let result = clean_field_value(&field, None, None, &no_siblings());
        assert_eq!(result, Err(vec!["This field is required.".to_string()]));
    }

    #[test]
    fn test_text_required_whitespace_only() {
        let field = text("title");
        let result = clean_field_value(&field, Some("   "), None, &no_siblings());
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_required_message() {
        let field = text("title").error_message("required", "A title is needed.");
        let result = clean_field_value(&field, Some(""), None, &no_siblings());
        assert_eq!(result, Err(vec!["A title is needed.".to_string()]));
    }

    #[test]
    fn test_optional_text_empty_is_null() {
        let field = text("bio").required(false).validator(Length::at_least(10));
        let result = clean_field_value(&field, None, None, &no_siblings());
        assert_eq!(result, Ok(Value::Null));
    }

    #[test]
    fn test_password_not_stripped() {
        let field = FormFieldDef::new("password", FormFieldType::Password);
        let result = clean_field_value(&field, Some(" p1 "), None, &no_siblings());
        assert_eq!(result, Ok(Value::from(" p1 ")));
    }

    #[test]
    fn test_textarea_keeps_newlines() {
        let field = FormFieldDef::new("content", FormFieldType::TextArea { strip: false });
        let result = clean_field_value(&field, Some("line1\nline2"), None, &no_siblings());
        assert_eq!(result, Ok(Value::from("line1\nline2")));
    }

    #[test]
    fn test_email_valid() {
        let field = FormFieldDef::new("email", FormFieldType::Email);
        let result = clean_field_value(&field, Some("alice@example.com"), None, &no_siblings());
        assert_eq!(result, Ok(Value::from("alice@example.com")));
    }

    #[test]
    fn test_email_invalid() {
        let field = FormFieldDef::new("email", FormFieldType::Email);
        for bad in ["not-an-email", "a@b", "@example.com", "a b@example.com"] {
            let result = clean_field_value(&field, Some(bad), None, &no_siblings());
            assert_eq!(
                result,
                Err(vec!["Invalid email address.".to_string()]),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_email_syntax_table() {
        let field = FormFieldDef::new("email", FormFieldType::Email);
        let cases = [
            ("o'brien@example.com", true),
            ("first.last+tag@mail.example.co", true),
            ("a..b@example.com", false),
            (".alice@example.com", false),
            ("alice.@example.com", false),
            ("a@x..com", false),
            ("a@-x.com", false),
            ("a@x-.com", false),
        ];
        for (addr, ok) in cases {
            let result = clean_field_value(&field, Some(addr), None, &no_siblings());
            assert_eq!(result.is_ok(), ok, "{addr}: {result:?}");
        }
    }

    #[test]
    fn test_email_required_before_syntax() {
        let field = FormFieldDef::new("email", FormFieldType::Email);
        let result = clean_field_value(&field, Some(""), None, &no_siblings());
        assert_eq!(result, Err(vec!["This field is required.".to_string()]));
    }

    #[test]
    fn test_boolean_values() {
        let field = FormFieldDef::new("remember", FormFieldType::Boolean).required(false);
        for (raw, expected) in [
            (Some("y"), true),
            (Some("on"), true),
            (Some("true"), true),
            (Some("1"), true),
            (Some("false"), false),
            (Some(""), false),
            (None, false),
        ] {
            assert_eq!(
                clean_field_value(&field, raw, None, &no_siblings()),
                Ok(Value::Bool(expected)),
                "{raw:?}"
            );
        }
    }

    #[test]
    fn test_required_boolean_unchecked() {
        let field = FormFieldDef::new("accept", FormFieldType::Boolean);
        assert!(clean_field_value(&field, None, None, &no_siblings()).is_err());
    }

    #[test]
    fn test_file_optional_absent() {
        let field = FormFieldDef::new("picture", FormFieldType::File)
            .required(false)
            .validator(FileAllowed::new(["jpg", "png"]));
        assert_eq!(
            clean_field_value(&field, None, None, &no_siblings()),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_file_empty_filename_is_absent() {
        let field = FormFieldDef::new("picture", FormFieldType::File).required(false);
        let file = UploadedFile::new("", "application/octet-stream", Vec::new());
        assert_eq!(
            clean_field_value(&field, None, Some(&file), &no_siblings()),
            Ok(Value::Null)
        );
    }

    #[test]
    fn test_file_extension_rejected() {
        let field = FormFieldDef::new("picture", FormFieldType::File)
            .required(false)
            .validator(FileAllowed::new(["jpg", "png"]));
        let file = UploadedFile::new("me.gif", "image/gif", vec![1]);
        let result = clean_field_value(&field, None, Some(&file), &no_siblings());
        assert!(result.unwrap_err()[0].contains("approved extension"));
    }

    #[test]
    fn test_first_failing_validator_wins() {
        let field = text("username")
            .validator(Length::at_least(5).message("first"))
            .validator(Length::at_most(1).message("second"));
        let result = clean_field_value(&field, Some("abc"), None, &no_siblings());
        assert_eq!(result, Err(vec!["first".to_string()]));
    }

    #[test]
    fn test_equal_to_reads_siblings() {
        let field = FormFieldDef::new("confirm_password", FormFieldType::Password)
            .validator(EqualTo::new("password"));
        let mut siblings = RawData::new();
        siblings.insert("password".to_string(), Some("p1".to_string()));
        assert!(clean_field_value(&field, Some("p1"), None, &siblings).is_ok());
        assert!(clean_field_value(&field, Some("p2"), None, &siblings).is_err());
    }

    #[test]
    fn test_error_message_override_by_code() {
        let field = text("username")
            .validator(Length::between(3, 25))
            .error_message("length", "Pick 3 to 25 characters.");
        let result = clean_field_value(&field, Some("ab"), None, &no_siblings());
        assert_eq!(result, Err(vec!["Pick 3 to 25 characters.".to_string()]));
    }

    #[test]
    fn test_field_type_metadata() {
        assert!(FormFieldType::Password.is_secret());
        assert!(!FormFieldType::Email.is_secret());
        assert_eq!(text("confirm_password").label, "confirm password");
    }
}
