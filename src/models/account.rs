//! Account identity used to count failed logins.

use std::cmp::Ordering;
use std::fmt;

/// Canonical `'user'@'host'` identity of a connecting account.
///
/// Keys compare and order case-insensitively; the original spelling is kept
/// for display.
#[derive(Debug, Clone)]
pub struct AccountKey(String);

impl AccountKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Build the quoted `'user'@'host'` form
    pub fn from_parts(user: &str, host: &str) -> Self {
        Self(format!("'{}'@'{}'", user, host))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    fn folded(&self) -> impl Iterator<Item = char> + '_ {
        self.0.chars().flat_map(char::to_lowercase)
    }
}

impl PartialEq for AccountKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AccountKey {}

impl PartialOrd for AccountKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AccountKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AccountKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}
