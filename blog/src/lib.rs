//! # blog
//!
//! Form and validation rule sets for a small blog application.
//!
//! This is the top-level crate: it re-exports the sub-crates, adds the post
//! form, a dispatcher over all six forms, and the `blog` management CLI.

/// Errors, settings, and logging setup.
pub use blog_core as core;

/// The form framework: submitted data, fields, validators, `Form`.
pub use blog_forms as forms;

/// User records, user stores, and the account forms.
pub use blog_auth as auth;

pub mod command;
pub mod commands;
pub mod posts;
pub mod submission;

pub use posts::{NewPost, PostForm};
pub use submission::{validate_for_display, validate_submission, FormKind};
