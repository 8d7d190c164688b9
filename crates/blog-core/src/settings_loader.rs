//! Building [`Settings`] from a file and the environment.
//!
//! A TOML or JSON document is merged over [`Settings::default`], so a file
//! only needs the keys it changes. `BLOG_*` variables are applied last.
//!
//! ## Environment variables
//!
//! | Env Var | Setting |
//! |---|---|
//! | `BLOG_DEBUG` | `debug` |
//! | `BLOG_LOG_LEVEL` | `log_level` |
//! | `BLOG_DATABASE_PATH` | `database.path` |
//! | `BLOG_MEDIA_ROOT` | `media_root` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use blog_core::settings_loader;
//!
//! let settings = settings_loader::from_file_with_env("blog.toml").unwrap();
//! ```

use std::path::{Path, PathBuf};

use crate::error::BlogError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys missing from the TOML keep their default values, including keys of
/// nested tables such as `[database]`.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, BlogError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| BlogError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, BlogError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        BlogError::ConfigurationError(format!(
            "Failed to read TOML file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, BlogError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, BlogError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| BlogError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a file, picking the format by extension, and then
/// applies environment variable overrides.
///
/// `.json` files are parsed as JSON; anything else is parsed as TOML.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, BlogError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if !is_json {
        return from_toml_file_with_env(path);
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        BlogError::ConfigurationError(format!(
            "Failed to read JSON file '{}': {e}",
            path.display()
        ))
    })?;
    let mut settings = from_json_str(&content)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `BLOG_*` environment variable overrides to a settings struct.
pub fn apply_env_overrides(settings: &mut Settings) {
    apply_overrides(settings, |key| std::env::var(key).ok());
}

/// Applies overrides from an arbitrary lookup function.
///
/// Split out from [`apply_env_overrides`] so the mapping can be tested without
/// mutating the process environment.
fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("BLOG_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Some(val) = lookup("BLOG_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Some(val) = lookup("BLOG_DATABASE_PATH") {
        settings.database.path = PathBuf::from(val);
    }

    if let Some(val) = lookup("BLOG_MEDIA_ROOT") {
        settings.media_root = PathBuf::from(val);
    }
}

fn merge_over_defaults(value: serde_json::Value, source: &str) -> Result<Settings, BlogError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        BlogError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        BlogError::ConfigurationError(format!("Failed to deserialize settings from {source}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => serde_json::Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = match base_map.remove(&key) {
                    Some(base_v) => merge_json(base_v, override_v),
                    None => override_v,
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "debug"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "debug");
        // Defaults preserved
        assert_eq!(settings.database.path, PathBuf::from("site.db"));
    }

    #[test]
    fn test_from_toml_str_database_table() {
        let toml = r#"
            [database]
            path = "/var/lib/blog/site.db"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.database.path, PathBuf::from("/var/lib/blog/site.db"));
        assert!(settings.debug);
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(matches!(result, Err(BlogError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let result = from_toml_str("debug = \"maybe\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"warn\"").unwrap();
        let settings = from_toml_file(file.path()).unwrap();
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = from_toml_file("/definitely/not/here/blog.toml");
        assert!(matches!(result, Err(BlogError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{"debug": false, "media_root": "uploads"}"#;
        let settings = from_json_str(json).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.media_root, PathBuf::from("uploads"));
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_json_str_empty_object() {
        let settings = from_json_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_from_file_picks_json_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"log_level": "warn", "database": {{"path": "blog.db"}}}}"#).unwrap();
        let settings = from_file_with_env(file.path()).unwrap();
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.database.path, PathBuf::from("blog.db"));
    }

    #[test]
    fn test_from_file_defaults_to_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "log_level = \"error\"").unwrap();
        let settings = from_file_with_env(file.path()).unwrap();
        assert_eq!(settings.log_level, "error");
    }

    #[test]
    fn test_from_file_json_malformed() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, "log_level = \"error\"").unwrap();
        let result = from_file_with_env(file.path());
        assert!(matches!(result, Err(BlogError::ConfigurationError(_))));
    }

    #[test]
    fn test_overrides_mapping() {
        let env: HashMap<&str, &str> = [
            ("BLOG_DEBUG", "0"),
            ("BLOG_LOG_LEVEL", "trace"),
            ("BLOG_DATABASE_PATH", ":memory:"),
            ("BLOG_MEDIA_ROOT", "/srv/media"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        apply_overrides(&mut settings, |key| env.get(key).map(ToString::to_string));

        assert!(!settings.debug);
        assert_eq!(settings.log_level, "trace");
        assert_eq!(settings.database.path, PathBuf::from(":memory:"));
        assert_eq!(settings.media_root, PathBuf::from("/srv/media"));
    }

    #[test]
    fn test_overrides_absent_keep_values() {
        let mut settings = Settings::default();
        apply_overrides(&mut settings, |_| None);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_merge_json_nested() {
        let base = serde_json::json!({"a": {"b": 1, "c": 2}});
        let over = serde_json::json!({"a": {"c": 3}});
        assert_eq!(merge_json(base, over), serde_json::json!({"a": {"b": 1, "c": 3}}));
    }
}
