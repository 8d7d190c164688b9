//! The `check` management command.
//!
//! Inspects the settings for problems that would only surface later: an
//! unreachable user store or a missing profile-picture directory.
//!
//! The check never creates the database. An existing file is opened without
//! the create flag; a missing one is reported and left for the first write.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use blog_auth::SqliteUserStore;
use blog_core::{BlogError, BlogResult, Settings};

use crate::command::ManagementCommand;

/// Runs configuration checks.
pub struct CheckCommand;

/// The result of a single check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMessage {
    /// Severity.
    pub level: CheckLevel,
    /// What is wrong.
    pub msg: String,
    /// How to fix it.
    pub hint: Option<String>,
    /// Stable identifier, e.g. `"storage.E001"`.
    pub id: &'static str,
}

/// Severity levels for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckLevel {
    /// Informational message.
    Info,
    /// Might be a problem.
    Warning,
    /// Must be fixed.
    Error,
}

impl fmt::Display for CheckLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl fmt::Display for CheckMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.level, self.id, self.msg)?;
        if let Some(hint) = &self.hint {
            write!(f, "\n\tHINT: {hint}")?;
        }
        Ok(())
    }
}

/// Runs the checks that need only the settings and the filesystem.
pub fn run_checks(settings: &Settings) -> Vec<CheckMessage> {
    let mut messages = Vec::new();

    let db_path = &settings.database.path;
    if db_path == Path::new(":memory:") {
        messages.push(CheckMessage {
            level: CheckLevel::Warning,
            msg: "the user store is in memory; users are lost on exit".to_string(),
            hint: None,
            id: "storage.W001",
        });
    } else {
        let parent = db_path.parent().filter(|p| !p.as_os_str().is_empty());
        if parent.is_some_and(|p| !p.is_dir()) {
            messages.push(CheckMessage {
                level: CheckLevel::Error,
                msg: format!("database directory for '{}' does not exist", db_path.display()),
                hint: Some("Create the directory or set BLOG_DATABASE_PATH".to_string()),
                id: "storage.E001",
            });
        }
    }

    if !settings.media_root.is_dir() {
        messages.push(CheckMessage {
            level: CheckLevel::Warning,
            msg: format!(
                "media root '{}' does not exist",
                settings.media_root.display()
            ),
            hint: Some("Profile pictures cannot be saved until it is created".to_string()),
            id: "media.W001",
        });
    }

    if settings.debug {
        messages.push(CheckMessage {
            level: CheckLevel::Info,
            msg: "debug mode is on; logs are human-readable rather than JSON".to_string(),
            hint: None,
            id: "logging.I001",
        });
    }

    messages
}

/// Opens an existing database read-write to confirm it is usable.
///
/// `:memory:` and a not-yet-created file are skipped; neither is touched.
pub fn check_store_reachable(db_path: &Path) -> Option<CheckMessage> {
    if db_path == Path::new(":memory:") {
        return None;
    }
    if !db_path.exists() {
        return Some(CheckMessage {
            level: CheckLevel::Info,
            msg: format!(
                "database '{}' does not exist yet; it is created on first write",
                db_path.display()
            ),
            hint: None,
            id: "storage.I001",
        });
    }
    SqliteUserStore::open_existing(db_path)
        .err()
        .map(|e| CheckMessage {
            level: CheckLevel::Error,
            msg: e.to_string(),
            hint: None,
            id: "storage.E002",
        })
}

#[async_trait]
impl ManagementCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Check the configuration for common problems"
    }

    async fn handle(&self, _matches: &clap::ArgMatches, settings: &Settings) -> BlogResult<()> {
        let mut messages = run_checks(settings);

        if !messages.iter().any(|m| m.level == CheckLevel::Error) {
            messages.extend(check_store_reachable(&settings.database.path));
        }

        messages.sort_by(|a, b| b.level.cmp(&a.level));
        for message in &messages {
            println!("{message}");
        }

        let errors = messages
            .iter()
            .filter(|m| m.level == CheckLevel::Error)
            .count();
        if errors > 0 {
            return Err(BlogError::ConfigurationError(format!(
                "System check identified {errors} error(s)"
            )));
        }
        println!("System check identified no issues.");
        Ok(())
    }
}
