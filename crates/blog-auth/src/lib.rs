//! # blog-auth
//!
//! Accounts for the blog.
//!
//! - [`user`] - User records and the session identity
//! - [`store`] - The [`UserLookup`](store::UserLookup) contract and an in-memory store
//! - [`sqlite`] - A SQLite-backed store
//! - [`forms`] - Registration, login, account update, and password-reset forms

pub mod forms;
pub mod sqlite;
pub mod store;
pub mod user;

pub use forms::{
    AccountChanges, AccountContext, LoginCredentials, LoginForm, NewAccount, NewPassword,
    RegistrationForm, RequestResetForm, ResetPasswordForm, ResetRequest, UpdateAccountForm,
};
pub use sqlite::SqliteUserStore;
pub use store::{InMemoryUserStore, UserLookup};
pub use user::{SessionUser, UserField, UserRecord};
