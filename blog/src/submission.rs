//! Dispatch over the six blog forms.
//!
//! A caller that only knows which form was submitted (a route name, a CLI
//! argument) picks a [`FormKind`] and hands the data to
//! [`validate_submission`]. Each call builds a fresh form, so no state
//! carries over between submissions.

use std::fmt;
use std::str::FromStr;

use blog_auth::{
    AccountContext, LoginForm, RegistrationForm, RequestResetForm, ResetPasswordForm,
    UpdateAccountForm,
};
use blog_core::{BlogError, BlogResult};
use blog_forms::{full_clean, Form, FormData, ValidationOutcome};

use crate::posts::PostForm;

/// The forms a submission can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    /// [`RegistrationForm`].
    Register,
    /// [`LoginForm`].
    Login,
    /// [`UpdateAccountForm`].
    Account,
    /// [`PostForm`].
    Post,
    /// [`RequestResetForm`].
    ResetRequest,
    /// [`ResetPasswordForm`].
    ResetPassword,
}

impl FormKind {
    /// Every kind, in a stable order.
    pub const ALL: [Self; 6] = [
        Self::Register,
        Self::Login,
        Self::Account,
        Self::Post,
        Self::ResetRequest,
        Self::ResetPassword,
    ];

    /// Returns the short name used on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::Login => "login",
            Self::Account => "account",
            Self::Post => "post",
            Self::ResetRequest => "reset-request",
            Self::ResetPassword => "reset-password",
        }
    }

    /// Returns `true` if validating this form consults the user store.
    pub const fn needs_store(self) -> bool {
        matches!(self, Self::Register | Self::Account | Self::ResetRequest)
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormKind {
    type Err = BlogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| BlogError::BadRequest(format!("unknown form: {s}")))
    }
}

/// Binds `data` to a fresh form of the given kind and validates it.
///
/// Forms that need no collaborators ignore `ctx`.
///
/// # Errors
///
/// Propagates storage failures from the user lookups.
pub async fn validate_submission(
    kind: FormKind,
    data: &FormData,
    ctx: &AccountContext,
) -> BlogResult<ValidationOutcome> {
    dispatch(kind, data, ctx, false).await
}

/// Like [`validate_submission`], with password values masked in the result.
///
/// # Errors
///
/// Propagates storage failures from the user lookups.
pub async fn validate_for_display(
    kind: FormKind,
    data: &FormData,
    ctx: &AccountContext,
) -> BlogResult<ValidationOutcome> {
    dispatch(kind, data, ctx, true).await
}

async fn dispatch(
    kind: FormKind,
    data: &FormData,
    ctx: &AccountContext,
    redact: bool,
) -> BlogResult<ValidationOutcome> {
    match kind {
        FormKind::Register => run(RegistrationForm::new(), data, ctx, redact).await,
        FormKind::Login => run(LoginForm::new(), data, &(), redact).await,
        FormKind::Account => run(UpdateAccountForm::new(), data, ctx, redact).await,
        FormKind::Post => run(PostForm::new(), data, &(), redact).await,
        FormKind::ResetRequest => run(RequestResetForm::new(), data, ctx, redact).await,
        FormKind::ResetPassword => run(ResetPasswordForm::new(), data, &(), redact).await,
    }
}

async fn run<F: Form>(
    mut form: F,
    data: &FormData,
    ctx: &F::Context,
    redact: bool,
) -> BlogResult<ValidationOutcome> {
    form.bind(data);
    let outcome = full_clean(&mut form, ctx).await?;
    Ok(if redact {
        outcome.redacted(form.fields())
    } else {
        outcome
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use blog_auth::{InMemoryUserStore, UserRecord};
    use blog_forms::validation::REDACTED;
    use blog_forms::Value;

    async fn ctx() -> AccountContext {
        let store = InMemoryUserStore::new();
        store
            .add_user(UserRecord::new(1, "alice", "alice@x.com"))
            .await
            .unwrap();
        AccountContext::new(Arc::new(store))
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in FormKind::ALL {
            assert_eq!(kind.as_str().parse::<FormKind>().unwrap(), kind);
        }
        assert!(matches!(
            "signup".parse::<FormKind>(),
            Err(BlogError::BadRequest(_))
        ));
    }

    #[test]
    fn test_needs_store() {
        assert!(FormKind::Register.needs_store());
        assert!(!FormKind::Post.needs_store());
        assert!(!FormKind::ResetPassword.needs_store());
    }

    #[tokio::test]
    async fn test_dispatch_register() {
        let data =
            FormData::parse("username=alice&email=new%40x.com&password=p1&confirm_password=p1");
        let outcome = validate_submission(FormKind::Register, &data, &ctx().await)
            .await
            .unwrap();
        assert_eq!(
            outcome.errors_for("username"),
            [blog_auth::forms::USERNAME_TAKEN.to_string()]
        );
    }

    #[tokio::test]
    async fn test_dispatch_post_ignores_store() {
        let ctx = AccountContext::new(Arc::new(InMemoryUserStore::unavailable()));
        let data = FormData::parse("title=Hi&content=There");
        let outcome = validate_submission(FormKind::Post, &data, &ctx).await.unwrap();
        assert!(outcome.is_accepted());
    }

    #[tokio::test]
    async fn test_display_masks_passwords() {
        let data = FormData::parse("email=alice%40x.com&password=hunter2");
        let outcome = validate_for_display(FormKind::Login, &data, &ctx().await)
            .await
            .unwrap();
        let ValidationOutcome::Accepted { cleaned_data } = outcome else {
            panic!("expected accepted outcome");
        };
        assert_eq!(cleaned_data["password"], Value::from(REDACTED));
        assert_eq!(cleaned_data["email"], Value::from("alice@x.com"));
        assert_eq!(cleaned_data["remember"], Value::Bool(false));
    }
}
