use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Root record for query operations.
pub const ROOT_QUERY: &str = "ROOT_QUERY";
/// Root record for mutation operations.
pub const ROOT_MUTATION: &str = "ROOT_MUTATION";
/// Root record for subscription operations.
pub const ROOT_SUBSCRIPTION: &str = "ROOT_SUBSCRIPTION";

/// Key of a record in the normalized store.
///
/// A `StoreKey` either names a real entity (whatever the identity resolver
/// produced, e.g. `Todo3`) or a synthetic location derived from the path the
/// writer took through a response (e.g. `ROOT_QUERY.feed.0`). The store does
/// not distinguish between the two.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreKey(String);

impl StoreKey {
    /// Wrap a key without validation.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Parse a key, rejecting the empty string.
    pub fn parse(key: &str) -> Result<Self, TypeError> {
        if key.is_empty() {
            return Err(TypeError::EmptyKey);
        }
        Ok(Self(key.to_string()))
    }

    /// The root record of query operations.
    pub fn root_query() -> Self {
        Self(ROOT_QUERY.to_string())
    }

    /// The root record of mutation operations.
    pub fn root_mutation() -> Self {
        Self(ROOT_MUTATION.to_string())
    }

    /// The root record of subscription operations.
    pub fn root_subscription() -> Self {
        Self(ROOT_SUBSCRIPTION.to_string())
    }

    /// Returns `true` for one of the three operation root keys.
    pub fn is_root(&self) -> bool {
        matches!(
            self.0.as_str(),
            ROOT_QUERY | ROOT_MUTATION | ROOT_SUBSCRIPTION
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Debug for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreKey({})", self.0)
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StoreKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for StoreKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl AsRef<str> for StoreKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for StoreKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}
