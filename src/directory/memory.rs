//! In-memory user directory.
//!
//! A `HashMap` of user records plus a name index, both behind one
//! `RwLock` so a rename can never be observed half-applied.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use tracing::debug;

use crate::model::{User, UserColumn, UserId, UserRow};
use crate::{Error, Result};
use super::UserDirectory;

/// In-memory directory. Cloning shares the same underlying data.
#[derive(Clone)]
pub struct MemoryDirectory {
    inner: Arc<DirectoryInner>,
}

struct DirectoryInner {
    state: RwLock<DirectoryState>,
    next_id: AtomicI64,
}

#[derive(Default)]
struct DirectoryState {
    users: HashMap<UserId, User>,
    /// name → id, case-sensitive
    by_name: HashMap<String, UserId>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DirectoryInner {
                state: RwLock::new(DirectoryState::default()),
                next_id: AtomicI64::new(1),
            }),
        }
    }

    /// Register a new user. Names are unique; "Cécile" and "Cecile" are
    /// different names.
    pub fn create(&self, name: &str, email: Option<&str>) -> Result<UserId> {
        let mut state = self.inner.state.write();
        if state.by_name.contains_key(name) {
            return Err(Error::ConstraintViolation(format!("user name {name:?} already exists")));
        }
        let id = UserId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let user = User {
            id,
            name: name.to_string(),
            created: Utc::now(),
            email: email.map(str::to_string),
        };
        state.by_name.insert(user.name.clone(), id);
        state.users.insert(id, user);
        debug!(target: "similar_users::directory", %id, name, "created user");
        Ok(id)
    }

    /// Change a user's name and email.
    pub fn rename(&self, id: UserId, name: &str, email: Option<&str>) -> Result<()> {
        let mut state = self.inner.state.write();
        if let Some(&holder) = state.by_name.get(name) {
            if holder != id {
                return Err(Error::ConstraintViolation(format!("user name {name:?} already exists")));
            }
        }
        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("user {id}")))?;
        let old_name = std::mem::replace(&mut user.name, name.to_string());
        user.email = email.map(str::to_string);
        state.by_name.remove(&old_name);
        state.by_name.insert(name.to_string(), id);
        Ok(())
    }

    /// Remove a user. Returns true if it existed.
    pub fn delete(&self, id: UserId) -> bool {
        let mut state = self.inner.state.write();
        match state.users.remove(&id) {
            Some(user) => {
                state.by_name.remove(&user.name);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.state.read().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn without_email(user: &User, fetch_email: bool) -> User {
    let mut user = user.clone();
    if !fetch_email {
        user.email = None;
    }
    user
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn get(&self, id: UserId, fetch_email: bool) -> Result<Option<User>> {
        let state = self.inner.state.read();
        Ok(state.users.get(&id).map(|u| without_email(u, fetch_email)))
    }

    async fn get_by_name(&self, name: &str, fetch_email: bool) -> Result<Option<User>> {
        let state = self.inner.state.read();
        Ok(state
            .by_name
            .get(name)
            .and_then(|id| state.users.get(id))
            .map(|u| without_email(u, fetch_email)))
    }

    async fn all_users(&self, columns: Option<&[UserColumn]>) -> Result<Vec<UserRow>> {
        let columns = columns.unwrap_or(&UserColumn::ALL);
        let state = self.inner.state.read();
        let mut users: Vec<&User> = state.users.values().collect();
        users.sort_by_key(|u| u.id);
        Ok(users.into_iter().map(|u| UserRow::project(u, columns)).collect())
    }

    async fn usernames(&self) -> Result<Vec<(UserId, String)>> {
        let state = self.inner.state.read();
        let mut names: Vec<(UserId, String)> = state
            .users
            .values()
            .map(|u| (u.id, u.name.clone()))
            .collect();
        names.sort_by_key(|(id, _)| *id);
        Ok(names)
    }

    async fn users_by_id(&self, ids: &[UserId]) -> Result<HashMap<UserId, String>> {
        let state = self.inner.state.read();
        Ok(ids
            .iter()
            .filter_map(|id| state.users.get(id).map(|u| (*id, u.name.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let dir = MemoryDirectory::new();
        let id = dir.create("izzy_cheezy", None).unwrap();
        let user = dir.get(id, false).await.unwrap().unwrap();
        assert_eq!(user.name, "izzy_cheezy");
        assert!(dir.get(UserId(404), false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_names_are_case_and_accent_sensitive() {
        let dir = MemoryDirectory::new();
        dir.create("Cécile", None).unwrap();
        dir.create("Cecile", None).unwrap();
        dir.create("cecile", None).unwrap();
        assert!(matches!(dir.create("Cecile", None), Err(Error::ConstraintViolation(_))));
        assert_eq!(dir.len(), 3);
    }

    #[tokio::test]
    async fn test_email_only_when_requested() {
        let dir = MemoryDirectory::new();
        let id = dir.create("one", Some("one@one.one")).unwrap();
        assert!(dir.get(id, false).await.unwrap().unwrap().email.is_none());
        assert_eq!(
            dir.get(id, true).await.unwrap().unwrap().email.as_deref(),
            Some("one@one.one")
        );
        assert!(dir.get_by_name("one", false).await.unwrap().unwrap().email.is_none());
        assert!(dir.get_by_name("one", true).await.unwrap().unwrap().email.is_some());
    }

    #[tokio::test]
    async fn test_rename_updates_name_index() {
        let dir = MemoryDirectory::new();
        let id = dir.create("barbazfoo", Some("barbaz@foo.com")).unwrap();
        dir.rename(id, "hello-world", Some("hello-world@foo.com")).unwrap();

        assert!(dir.get_by_name("barbazfoo", false).await.unwrap().is_none());
        let user = dir.get_by_name("hello-world", true).await.unwrap().unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email.as_deref(), Some("hello-world@foo.com"));
        assert!(matches!(dir.rename(UserId(999), "x", None), Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = MemoryDirectory::new();
        let id = dir.create("frank", None).unwrap();
        assert!(dir.delete(id));
        assert!(!dir.delete(id));
        assert!(dir.get(id, false).await.unwrap().is_none());
        // the name is free again
        dir.create("frank", None).unwrap();
    }
}
