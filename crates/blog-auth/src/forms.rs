//! Account forms.
//!
//! - [`RegistrationForm`] - Sign up; username and email must be unused
//! - [`LoginForm`] - Email, password, and "remember me"
//! - [`UpdateAccountForm`] - Change username/email/picture of the current user
//! - [`RequestResetForm`] - Ask for a reset link; the email must be registered
//! - [`ResetPasswordForm`] - Choose a new password
//!
//! Each form wraps a [`BaseForm`] and implements [`Form`]. Forms that consult
//! the user store take an [`AccountContext`]; the others take `()`. After a
//! successful [`Form::is_valid`], the typed accessor on each form
//! (`account()`, `credentials()`, ...) returns the submission as a struct.
//!
//! Authentication, record creation, and password hashing happen in the
//! caller once a form is accepted.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use blog_core::BlogResult;
use blog_forms::fields::{FormFieldDef, FormFieldType};
use blog_forms::form::{BaseForm, ErrorMap, Form};
use blog_forms::validators::{EqualTo, FileAllowed, Length};
use blog_forms::UploadedFile;

use crate::store::UserLookup;
use crate::user::{SessionUser, UserField};

/// Shown when the username belongs to another user.
pub const USERNAME_TAKEN: &str = "UserName is taken";
/// Shown when the email belongs to another user.
pub const EMAIL_REGISTERED: &str = "Email is already registered";
/// Shown when a reset is requested for an unknown email.
pub const NO_ACCOUNT: &str = "No account exists with that email. You must register first.";
/// Shown when the registration passwords differ.
pub const PASSWORDS_MUST_MATCH: &str = "Passwords must match";

/// Collaborators for the forms that look at persisted users.
#[derive(Clone)]
pub struct AccountContext {
    /// Lookup capability over persisted users.
    pub users: Arc<dyn UserLookup>,
    /// The authenticated user, if the request has one.
    pub current_user: Option<SessionUser>,
}

impl AccountContext {
    /// Creates a context for an anonymous request.
    pub fn new(users: Arc<dyn UserLookup>) -> Self {
        Self {
            users,
            current_user: None,
        }
    }

    /// Sets the authenticated user.
    #[must_use]
    pub fn with_user(mut self, user: SessionUser) -> Self {
        self.current_user = Some(user);
        self
    }
}

impl fmt::Debug for AccountContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountContext")
            .field("current_user", &self.current_user)
            .finish_non_exhaustive()
    }
}

// ── field builders ──────────────────────────────────────────────────

fn username_field() -> FormFieldDef {
    FormFieldDef::new("username", FormFieldType::Text { strip: true })
        .label("Username")
        .validator(Length::between(3, 25))
}

fn email_field() -> FormFieldDef {
    FormFieldDef::new("email", FormFieldType::Email).label("Email")
}

fn password_field() -> FormFieldDef {
    FormFieldDef::new("password", FormFieldType::Password).label("Password")
}

fn confirm_password_field(equal: EqualTo) -> FormFieldDef {
    FormFieldDef::new("confirm_password", FormFieldType::Password)
        .label("Confirm Password")
        .validator(equal)
}

fn push_error(errors: &mut ErrorMap, field: UserField, message: &str) {
    errors
        .entry(field.column().to_string())
        .or_default()
        .push(message.to_string());
}

/// Returns the cleaned text for `field`, or an empty string.
fn text(base: &BaseForm, field: &str) -> String {
    base.cleaned_str(field).unwrap_or_default().to_string()
}

struct Redacted;

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"********\"")
    }
}

// ── RegistrationForm ────────────────────────────────────────────────

/// An accepted registration.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAccount {
    /// Stripped username.
    pub username: String,
    /// Stripped email.
    pub email: String,
    /// Plain-text password, for the caller to hash.
    pub password: String,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &Redacted)
            .finish()
    }
}

/// Sign-up form.
///
/// Username (3 to 25 characters) and email must not belong to any user.
/// The confirmation uses the custom message [`PASSWORDS_MUST_MATCH`].
#[derive(Debug)]
pub struct RegistrationForm {
    inner: BaseForm,
}

impl RegistrationForm {
    /// Creates an unbound registration form.
    pub fn new() -> Self {
        Self {
            inner: BaseForm::new(
                "registration",
                vec![
                    username_field(),
                    email_field(),
                    password_field(),
                    confirm_password_field(
                        EqualTo::new("password").message(PASSWORDS_MUST_MATCH),
                    ),
                ],
            ),
        }
    }

    /// Returns the accepted submission.
    pub fn account(&self) -> Option<NewAccount> {
        self.inner.is_accepted().then(|| NewAccount {
            username: text(&self.inner, "username"),
            email: text(&self.inner, "email"),
            password: text(&self.inner, "password"),
        })
    }
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Form for RegistrationForm {
    type Context = AccountContext;

    fn base(&self) -> &BaseForm {
        &self.inner
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        &mut self.inner
    }

    async fn clean(&self, ctx: &AccountContext) -> BlogResult<ErrorMap> {
        let mut errors = ErrorMap::new();
        for (field, message) in [
            (UserField::Username, USERNAME_TAKEN),
            (UserField::Email, EMAIL_REGISTERED),
        ] {
            let Some(value) = self.inner.cleaned_str(field.column()) else {
                continue;
            };
            if ctx.users.exists_other(field, value, None).await? {
                tracing::debug!(%field, "value already registered");
                push_error(&mut errors, field, message);
            }
        }
        Ok(errors)
    }
}

// ── LoginForm ───────────────────────────────────────────────────────

/// Accepted login input. Checking the password is the caller's job.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    /// Stripped email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Whether to keep the session beyond the browser session.
    pub remember: bool,
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &Redacted)
            .field("remember", &self.remember)
            .finish()
    }
}

/// Login form. Purely structural.
#[derive(Debug)]
pub struct LoginForm {
    inner: BaseForm,
}

impl LoginForm {
    /// Creates an unbound login form.
    pub fn new() -> Self {
        Self {
            inner: BaseForm::new(
                "login",
                vec![
                    email_field(),
                    password_field(),
                    FormFieldDef::new("remember", FormFieldType::Boolean)
                        .label("Remember Me")
                        .required(false),
                ],
            ),
        }
    }

    /// Returns the accepted submission.
    pub fn credentials(&self) -> Option<LoginCredentials> {
        self.inner.is_accepted().then(|| LoginCredentials {
            email: text(&self.inner, "email"),
            password: text(&self.inner, "password"),
            remember: self.inner.cleaned_bool("remember").unwrap_or(false),
        })
    }
}

impl Default for LoginForm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Form for LoginForm {
    type Context = ();

    fn base(&self) -> &BaseForm {
        &self.inner
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        &mut self.inner
    }
}

// ── UpdateAccountForm ───────────────────────────────────────────────

/// Accepted account changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountChanges {
    /// New (or unchanged) username.
    pub username: String,
    /// New (or unchanged) email.
    pub email: String,
    /// New profile picture, if one was uploaded.
    pub picture: Option<UploadedFile>,
}

/// Account settings form for the current user.
///
/// A username or email equal to the current user's own value is accepted
/// without a lookup. Any other value must not belong to another user.
/// Without a current user every value is checked against all users.
#[derive(Debug)]
pub struct UpdateAccountForm {
    inner: BaseForm,
}

impl UpdateAccountForm {
    /// Creates an unbound account form.
    pub fn new() -> Self {
        Self {
            inner: BaseForm::new(
                "update_account",
                vec![
                    username_field(),
                    email_field(),
                    FormFieldDef::new("picture", FormFieldType::File)
                        .label("Update Profile Picture")
                        .required(false)
                        .validator(FileAllowed::new(["jpg", "png"])),
                ],
            ),
        }
    }

    /// Returns the accepted submission.
    pub fn changes(&self) -> Option<AccountChanges> {
        self.inner.is_accepted().then(|| AccountChanges {
            username: text(&self.inner, "username"),
            email: text(&self.inner, "email"),
            picture: self.inner.cleaned_file("picture").cloned(),
        })
    }
}

impl Default for UpdateAccountForm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Form for UpdateAccountForm {
    type Context = AccountContext;

    fn base(&self) -> &BaseForm {
        &self.inner
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        &mut self.inner
    }

    async fn clean(&self, ctx: &AccountContext) -> BlogResult<ErrorMap> {
        let mut errors = ErrorMap::new();
        let current = ctx.current_user.as_ref();
        for (field, message) in [
            (UserField::Username, USERNAME_TAKEN),
            (UserField::Email, EMAIL_REGISTERED),
        ] {
            let Some(value) = self.inner.cleaned_str(field.column()) else {
                continue;
            };
            if current.is_some_and(|user| user.get(field) == value) {
                continue;
            }
            let exclude = current.map(|user| user.id);
            if ctx.users.exists_other(field, value, exclude).await? {
                tracing::debug!(%field, "value belongs to another user");
                push_error(&mut errors, field, message);
            }
        }
        Ok(errors)
    }
}

// ── RequestResetForm ────────────────────────────────────────────────

/// An accepted reset request for a registered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetRequest {
    /// The registered email.
    pub email: String,
}

/// Password-reset request form. The email must already be registered.
#[derive(Debug)]
pub struct RequestResetForm {
    inner: BaseForm,
}

impl RequestResetForm {
    /// Creates an unbound reset-request form.
    pub fn new() -> Self {
        Self {
            inner: BaseForm::new("request_reset", vec![email_field()]),
        }
    }

    /// Returns the accepted submission.
    pub fn request(&self) -> Option<ResetRequest> {
        self.inner.is_accepted().then(|| ResetRequest {
            email: text(&self.inner, "email"),
        })
    }
}

impl Default for RequestResetForm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Form for RequestResetForm {
    type Context = AccountContext;

    fn base(&self) -> &BaseForm {
        &self.inner
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        &mut self.inner
    }

    async fn clean(&self, ctx: &AccountContext) -> BlogResult<ErrorMap> {
        let mut errors = ErrorMap::new();
        if let Some(email) = self.inner.cleaned_str("email") {
            if ctx.users.find_by(UserField::Email, email).await?.is_none() {
                push_error(&mut errors, UserField::Email, NO_ACCOUNT);
            }
        }
        Ok(errors)
    }
}

// ── ResetPasswordForm ───────────────────────────────────────────────

/// An accepted new password.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword {
    /// Plain-text password, for the caller to hash.
    pub password: String,
}

impl fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewPassword")
            .field("password", &Redacted)
            .finish()
    }
}

/// New-password form.
///
/// The confirmation keeps the default equality message
/// (`Field must be equal to password.`), unlike [`RegistrationForm`].
#[derive(Debug)]
pub struct ResetPasswordForm {
    inner: BaseForm,
}

impl ResetPasswordForm {
    /// Creates an unbound reset form.
    pub fn new() -> Self {
        Self {
            inner: BaseForm::new(
                "reset_password",
                vec![password_field(), confirm_password_field(EqualTo::new("password"))],
            ),
        }
    }

    /// Returns the accepted submission.
    pub fn new_password(&self) -> Option<NewPassword> {
        self.inner.is_accepted().then(|| NewPassword {
            password: text(&self.inner, "password"),
        })
    }
}

impl Default for ResetPasswordForm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Form for ResetPasswordForm {
    type Context = ();

    fn base(&self) -> &BaseForm {
        &self.inner
    }

    fn base_mut(&mut self) -> &mut BaseForm {
        &mut self.inner
    }
}
