//! # blog-core
//!
//! Core types shared by every crate of the blog form layer. This crate has no
//! internal dependencies and provides the foundation for the others.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Application settings with defaults
//! - [`settings_loader`] - Loading settings from TOML/JSON files and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{BlogError, BlogResult, ValidationError};
pub use settings::{DatabaseSettings, Settings};
