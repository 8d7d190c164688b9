//! User records and the session identity.
//!
//! The forms in this crate only ever read these; creating and updating
//! records is the caller's job once a submission has been accepted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A persisted user, as far as the account forms are concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Primary key.
    pub id: i64,
    /// Unique display name.
    pub username: String,
    /// Unique email address.
    pub email: String,
}

impl UserRecord {
    /// Creates a record.
    pub fn new(id: i64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
        }
    }

    /// Returns the value of the given lookup field.
    pub fn get(&self, field: UserField) -> &str {
        match field {
            UserField::Username => &self.username,
            UserField::Email => &self.email,
        }
    }
}

/// The authenticated user of the current request.
///
/// A snapshot taken from the session layer. Used by the account-update form
/// so a user can resubmit their own username or email unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// Primary key of the underlying record.
    pub id: i64,
    /// Current username.
    pub username: String,
    /// Current email.
    pub email: String,
}

impl SessionUser {
    /// Returns the current value of the given field.
    pub fn get(&self, field: UserField) -> &str {
        match field {
            UserField::Username => &self.username,
            UserField::Email => &self.email,
        }
    }
}

impl From<UserRecord> for SessionUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            email: record.email,
        }
    }
}

impl From<&UserRecord> for SessionUser {
    fn from(record: &UserRecord) -> Self {
        Self::from(record.clone())
    }
}

/// The unique fields a user can be looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    /// The `username` column.
    Username,
    /// The `email` column.
    Email,
}

impl UserField {
    /// Returns the storage column name.
    pub const fn column(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_get() {
        let user = UserRecord::new(1, "alice", "alice@x.com");
        assert_eq!(user.get(UserField::Username), "alice");
        assert_eq!(user.get(UserField::Email), "alice@x.com");
    }

    #[test]
    fn test_session_user_from_record() {
        let session = SessionUser::from(&UserRecord::new(7, "bob", "bob@x.com"));
        assert_eq!(session.id, 7);
        assert_eq!(session.get(UserField::Username), "bob");
    }

    #[test]
    fn test_field_column() {
        assert_eq!(UserField::Username.column(), "username");
        assert_eq!(UserField::Email.to_string(), "email");
    }
}
