//! SQLite user store using `rusqlite`.
//!
//! The connection sits behind a `tokio::sync::Mutex` and every statement runs
//! inside `tokio::task::spawn_blocking`, so lookups never block the async
//! runtime. The `user` table enforces UNIQUE `username` and `email`, which
//! closes the window between a form accepting a value and the caller
//! inserting it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use blog_core::{BlogError, BlogResult};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tokio::sync::Mutex;

use crate::store::UserLookup;
use crate::user::{UserField, UserRecord};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "user" (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username VARCHAR(25) NOT NULL UNIQUE,
    email VARCHAR(120) NOT NULL UNIQUE
);
"#;

/// A user store backed by a SQLite database.
pub struct SqliteUserStore {
    path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteUserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteUserStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteUserStore {
    /// Opens (or creates) the database at `path` and ensures the schema exists.
    ///
    /// A path of `:memory:` opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::StorageUnavailable`] if the database cannot be
    /// opened or initialised.
    pub fn open(path: impl Into<PathBuf>) -> BlogResult<Self> {
        let path = path.into();
        let conn = if path.to_str() == Some(":memory:") {
            Connection::open_in_memory()
        } else {
            Connection::open(&path)
        }
        .map_err(|e| BlogError::StorageUnavailable(format!("SQLite open failed: {e}")))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| BlogError::StorageUnavailable(format!("schema setup failed: {e}")))?;

        tracing::debug!(path = %path.display(), "opened user store");
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens a database that must already exist, without creating it.
    ///
    /// The file is opened read-write and the `user` table must be present;
    /// nothing is written.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::StorageUnavailable`] if the file is missing,
    /// cannot be opened, or has no `user` table.
    pub fn open_existing(path: impl Into<PathBuf>) -> BlogResult<Self> {
        let path = path.into();
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| BlogError::StorageUnavailable(format!("SQLite open failed: {e}")))?;

        conn.prepare(r#"SELECT id, username, email FROM "user" LIMIT 1"#)
            .map_err(|e| BlogError::StorageUnavailable(format!("schema missing: {e}")))?;

        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn memory() -> BlogResult<Self> {
        Self::open(":memory:")
    }

    /// Returns the database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inserts a new user and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::IntegrityError`] if the username or email is
    /// already taken, or [`BlogError::DatabaseError`] for other failures.
    pub async fn create_user(&self, username: &str, email: &str) -> BlogResult<UserRecord> {
        let conn = self.conn.clone();
        let username = username.to_string();
        let email = email.to_string();

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.execute(
                r#"INSERT INTO "user" (username, email) VALUES (?1, ?2)"#,
                params![username, email],
            )
            .map_err(map_write_error)?;
            let id = conn.last_insert_rowid();
            drop(conn);
            tracing::info!(id, %username, "created user");
            Ok(UserRecord {
                id,
                username,
                email,
            })
        })
        .await
        .map_err(|e| BlogError::DatabaseError(format!("Task join error: {e}")))?
    }
}

#[async_trait]
impl UserLookup for SqliteUserStore {
    async fn find_by(&self, field: UserField, value: &str) -> BlogResult<Option<UserRecord>> {
        let conn = self.conn.clone();
        let value = value.to_string();
        // Column names come from a closed enum, never from input.
        let sql = format!(
            r#"SELECT id, username, email FROM "user" WHERE {} = ?1 LIMIT 1"#,
            field.column()
        );

        tokio::task::spawn_blocking(move || {
            let conn = conn.blocking_lock();
            conn.query_row(&sql, params![value], |row| {
                Ok(UserRecord {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                })
            })
            .optional()
            .map_err(|e| BlogError::DatabaseError(format!("{e}")))
        })
        .await
        .map_err(|e| BlogError::DatabaseError(format!("Task join error: {e}")))?
    }
}

fn map_write_error(e: rusqlite::Error) -> BlogError {
    let unique_violation = matches!(
        &e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    );
    if unique_violation {
        BlogError::IntegrityError(format!("{e}"))
    } else {
        BlogError::DatabaseError(format!("{e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_create_and_find() {
        let store = SqliteUserStore::memory().unwrap();
        let alice = store.create_user("alice", "alice@x.com").await.unwrap();
        assert_eq!(alice.id, 1);

        let found = store.find_by(UserField::Email, "alice@x.com").await.unwrap();
        assert_eq!(found, Some(alice));
        assert!(store
            .find_by(UserField::Username, "bob")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_unique_constraint_is_integrity_error() {
        let store = SqliteUserStore::memory().unwrap();
        store.create_user("alice", "alice@x.com").await.unwrap();
        let result = store.create_user("alice", "new@x.com").await;
        assert!(matches!(result, Err(BlogError::IntegrityError(_))));
        let result = store.create_user("bob", "alice@x.com").await;
        assert!(matches!(result, Err(BlogError::IntegrityError(_))));
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let store = SqliteUserStore::memory().unwrap();
        store.create_user("alice", "alice@x.com").await.unwrap();
        assert!(store
            .find_by(UserField::Username, "ALICE")
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_open_unreachable_path() {
        let result = SqliteUserStore::open("/nonexistent-dir/for/sure/site.db");
        assert!(matches!(result, Err(BlogError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_username_column_fits_longest_allowed_name() {
        let store = SqliteUserStore::memory().unwrap();
        let name = "u".repeat(25);
        store.create_user(&name, "long@x.com").await.unwrap();

        let conn = store.conn.lock().await;
        let sql: String = conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE name = 'user'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert!(sql.contains("username VARCHAR(25)"));
    }

    #[test]
    fn test_open_existing_does_not_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.db");
        let result = SqliteUserStore::open_existing(&path);
        assert!(matches!(result, Err(BlogError::StorageUnavailable(_))));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_open_existing_reads_created_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.db");
        SqliteUserStore::open(&path)
            .unwrap()
            .create_user("alice", "alice@x.com")
            .await
            .unwrap();

        let store = SqliteUserStore::open_existing(&path).unwrap();
        let found = store.find_by(UserField::Username, "alice").await.unwrap();
        assert_eq!(found.map(|u| u.email), Some("alice@x.com".to_string()));
    }

    #[test]
    fn test_open_existing_without_schema() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = SqliteUserStore::open_existing(file.path());
        assert!(matches!(result, Err(BlogError::StorageUnavailable(_))));
    }

    #[test]
    fn test_debug_shows_path() {
        let store = SqliteUserStore::memory().unwrap();
        assert_eq!(store.path(), Path::new(":memory:"));
        assert!(format!("{store:?}").contains(":memory:"));
    }
}
