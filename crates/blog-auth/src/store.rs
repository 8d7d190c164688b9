//! The user-lookup contract and an in-memory implementation.
//!
//! [`UserLookup`] is the only storage capability the account forms need:
//! find at most one user whose `username` or `email` equals a value exactly.
//! Implementations report an unreachable store as `Err`; "no such user" is
//! `Ok(None)`.

use std::sync::Arc;

use async_trait::async_trait;
use blog_core::{BlogError, BlogResult};
use tokio::sync::RwLock;

use crate::user::{UserField, UserRecord};

/// Read-only access to persisted users.
#[async_trait]
pub trait UserLookup: Send + Sync {
    /// Finds the user whose `field` equals `value` exactly (case-sensitive).
    async fn find_by(&self, field: UserField, value: &str) -> BlogResult<Option<UserRecord>>;

    /// Returns `true` if a user other than `exclude_id` holds `value` in `field`.
    async fn exists_other(
        &self,
        field: UserField,
        value: &str,
        exclude_id: Option<i64>,
    ) -> BlogResult<bool> {
        let found = self.find_by(field, value).await?;
        Ok(found.is_some_and(|user| Some(user.id) != exclude_id))
    }
}

/// An in-memory user store.
///
/// Seeded with [`add_user`](Self::add_user). The [`unavailable`](Self::unavailable)
/// constructor builds a store whose every lookup fails, which is how callers
/// observe storage-failure propagation.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<Vec<UserRecord>>>,
    offline: bool,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose lookups fail with [`BlogError::StorageUnavailable`].
    pub fn unavailable() -> Self {
        Self {
            users: Arc::default(),
            offline: true,
        }
    }

    /// Adds a user to the store.
    ///
    /// # Errors
    ///
    /// Returns [`BlogError::IntegrityError`] if the id, username, or email is
    /// already in use.
    pub async fn add_user(&self, user: UserRecord) -> BlogResult<()> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.iter().find(|u| {
            u.id == user.id || u.username == user.username || u.email == user.email
        }) {
            return Err(BlogError::IntegrityError(format!(
                "user {} conflicts with existing user {}",
                user.username, existing.id
            )));
        }
        users.push(user);
        drop(users);
        Ok(())
    }

    /// Returns the number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns `true` if the store holds no users.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserLookup for InMemoryUserStore {
    async fn find_by(&self, field: UserField, value: &str) -> BlogResult<Option<UserRecord>> {
        if self.offline {
            return Err(BlogError::StorageUnavailable(
                "in-memory user store is offline".to_string(),
            ));
        }
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.get(field) == value).cloned())
    }
}
