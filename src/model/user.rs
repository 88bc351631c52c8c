//! User identity as seen by the similarity core.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// Stable numeric user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(raw: i64) -> Self {
        UserId(raw)
    }
}

/// Parses an opaque import key. Surrounding whitespace is tolerated,
/// anything else that is not a base-10 integer is rejected.
impl FromStr for UserId {
    type Err = Error;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        key.trim()
            .parse::<i64>()
            .map(UserId)
            .map_err(|e| Error::MalformedKey {
                key: key.to_string(),
                reason: e.to_string(),
            })
    }
}

/// A user record from the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Login/display name. Unique, compared case-sensitively by code points.
    pub name: String,
    pub created: DateTime<Utc>,
    /// Only populated when the caller asked for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl User {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            created: Utc::now(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Column selector for projected directory scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserColumn {
    Id,
    Name,
    Created,
}

impl UserColumn {
    /// Every column returned when no projection is requested.
    pub const ALL: [UserColumn; 3] = [UserColumn::Id, UserColumn::Name, UserColumn::Created];
}

/// A column-projected user row. Columns that were not selected are `None`
/// and are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl UserRow {
    /// Project `user` onto `columns`.
    pub fn project(user: &User, columns: &[UserColumn]) -> Self {
        let mut row = UserRow::default();
        for column in columns {
            match column {
                UserColumn::Id => row.id = Some(user.id),
                UserColumn::Name => row.name = Some(user.name.clone()),
                UserColumn::Created => row.created = Some(user.created),
            }
        }
        row
    }

    pub fn has(&self, column: UserColumn) -> bool {
        match column {
            UserColumn::Id => self.id.is_some(),
            UserColumn::Name => self.name.is_some(),
            UserColumn::Created => self.created.is_some(),
        }
    }
}
