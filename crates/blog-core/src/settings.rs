//! Settings for the blog form layer.
//!
//! [`Settings`] holds the small amount of configuration the validation layer
//! and its CLI need. Settings are plain values passed explicitly to whoever
//! needs them; there is no global settings object.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// User-record store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the `SQLite` database file, or `:memory:`.
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("site.db"),
        }
    }
}

/// The complete set of application settings.
///
/// # Examples
///
/// ```
/// use blog_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.log_level, "info");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled. Controls the log format.
    pub debug: bool,
    /// The log filter directive (e.g. "info", "`blog_forms=debug`").
    pub log_level: String,
    /// The user-record store.
    pub database: DatabaseSettings,
    /// Directory where accepted profile pictures are saved by the caller.
    pub media_root: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: true,
            log_level: "info".to_string(),
            database: DatabaseSettings::default(),
            media_root: PathBuf::from("static/profile_pics"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.debug);
        assert_eq!(settings.database.path, PathBuf::from("site.db"));
        assert_eq!(settings.media_root, PathBuf::from("static/profile_pics"));
    }

    #[test]
    fn test_settings_roundtrip_json() {
        let settings = Settings::default();
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
