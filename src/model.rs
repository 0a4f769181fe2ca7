//! Data model for Mastodon accounts and the handles printed by the CLI.

use serde::Deserialize;
use std::fmt;

/// Account as returned by `GET /api/v1/accounts/lookup`. Only the fields we use.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    pub username: String,
    pub acct: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub following_count: u64,
}

impl Account {
    /// Count the account reports for the given listing.
    pub fn count_for(&self, relation: Relation) -> u64 {
        match relation {
            Relation::Following => self.following_count,
            Relation::Followers => self.followers_count,
        }
    }
}

/// One element of a following/followers page.
#[derive(Debug, Clone, Deserialize)]
pub struct ListedAccount {
    pub acct: String,
}

/// Which listing to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Accounts the target follows.
    Following,
    /// Accounts following the target.
    Followers,
}

impl Relation {
    /// Path segment under `/api/v1/accounts/{id}/`.
    pub fn path_segment(self) -> &'static str {
        match self {
            Relation::Following => "following",
            Relation::Followers => "followers",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

/// `username@host`, or bare `username` for accounts local to the listing instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FollowerHandle(String);

impl FollowerHandle {
    pub fn new(acct: impl Into<String>) -> Self {
        Self(acct.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the handle carries no `@host` part.
    pub fn is_bare(&self) -> bool {
        !self.0.contains('@')
    }

    /// Handle with `@instance_host` appended when it is bare.
    pub fn qualified(&self, instance_host: &str) -> FollowerHandle {
        if self.is_bare() {
            FollowerHandle(format!("{}@{}", self.0, instance_host))
        } else {
            self.clone()
        }
    }
}

impl fmt::Display for FollowerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ListedAccount> for FollowerHandle {
    fn from(account: ListedAccount) -> Self {
        FollowerHandle(account.acct)
    }
}
