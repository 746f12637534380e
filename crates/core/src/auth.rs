//! Admin credential check.
//!
//! This gates the dashboard surfaces only. It is not a security boundary:
//! credentials come from plain configuration and are compared as given.

use std::fmt;

use serde::Deserialize;

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub trait Authenticator: Send + Sync {
    fn authenticate(&self, credentials: &Credentials) -> bool;
}

/// Accepts any username/password pair present in a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StaticAllowList {
    entries: Vec<Credentials>,
}

impl StaticAllowList {
    pub fn new(entries: Vec<Credentials>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Authenticator for StaticAllowList {
    fn authenticate(&self, credentials: &Credentials) -> bool {
        !credentials.username.is_empty()
            && self.entries.iter().any(|entry| entry == credentials)
    }
}
