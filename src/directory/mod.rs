//! # User Directory
//!
//! The identity collaborator. The similarity core only reads from it:
//! graph queries resolve neighbor ids to current names, and the search
//! ranker enumerates usernames as the fuzzy-match corpus.
//!
//! Creating, renaming and deleting users belongs to the identity layer.
//! [`MemoryDirectory`] exposes those operations as inherent methods so
//! tests and embedders have something to populate.

pub mod memory;

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::model::{User, UserColumn, UserId, UserRow};
use crate::Result;

pub use memory::MemoryDirectory;

/// Read-side contract of the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Look a user up by id. `email` is only filled in when `fetch_email` is set.
    async fn get(&self, id: UserId, fetch_email: bool) -> Result<Option<User>>;

    /// Look a user up by exact (case-sensitive) name.
    async fn get_by_name(&self, name: &str, fetch_email: bool) -> Result<Option<User>>;

    /// Every user, projected onto `columns` (all columns when `None`).
    async fn all_users(&self, columns: Option<&[UserColumn]>) -> Result<Vec<UserRow>>;

    /// The searchable username corpus.
    async fn usernames(&self) -> Result<Vec<(UserId, String)>>;

    /// Resolve ids to names. Unknown ids are left out.
    ///
    /// Default: one `get` per distinct id.
    async fn users_by_id(&self, ids: &[UserId]) -> Result<HashMap<UserId, String>> {
        let mut names = HashMap::with_capacity(ids.len());
        for &id in ids {
            if names.contains_key(&id) {
                continue;
            }
            if let Some(user) = self.get(id, false).await? {
                names.insert(id, user.name);
            }
        }
        Ok(names)
    }

    /// Users in the order their ids were given. Unknown ids are dropped and
    /// a repeated id only appears once, at its first position.
    async fn users_in_order(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let mut seen = HashSet::with_capacity(ids.len());
        let mut users = Vec::with_capacity(ids.len());
        for &id in ids {
            if !seen.insert(id) {
                continue;
            }
            if let Some(user) = self.get(id, false).await? {
                users.push(user);
            }
        }
        Ok(users)
    }

    /// Same as [`users_in_order`](Self::users_in_order), keyed by name.
    async fn validate_usernames(&self, names: &[&str]) -> Result<Vec<User>> {
        let mut seen = HashSet::with_capacity(names.len());
        let mut users = Vec::with_capacity(names.len());
        for &name in names {
            if !seen.insert(name) {
                continue;
            }
            if let Some(user) = self.get_by_name(name, false).await? {
                users.push(user);
            }
        }
        Ok(users)
    }
}
