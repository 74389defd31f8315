//! Fragment type-condition matching.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Outcome of testing an object against a fragment's type condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeMatch {
    /// The object's type satisfies the condition.
    Match,
    /// The object's type is known and does not satisfy the condition.
    NoMatch,
    /// The object carries no typename; the fragment is applied heuristically.
    Unknown,
}

/// Abstract type (interface or union) → concrete member types.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PossibleTypes {
    members: BTreeMap<String, BTreeSet<String>>,
}

impl PossibleTypes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `concrete` as a member of `abstract_type`.
    pub fn add(&mut self, abstract_type: impl Into<String>, concrete: impl Into<String>) {
        self.members
            .entry(abstract_type.into())
            .or_default()
            .insert(concrete.into());
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Test `typename` against a fragment's type condition.
    ///
    /// A condition naming an abstract type that was never registered only
    /// matches an object whose typename is that exact name.
    pub fn matches(&self, condition: &str, typename: Option<&str>) -> TypeMatch {
        let Some(typename) = typename else {
            return TypeMatch::Unknown;
        };
        let is_member = self
            .members
            .get(condition)
            .is_some_and(|members| members.contains(typename));
        if typename == condition || is_member {
            TypeMatch::Match
        } else {
            TypeMatch::NoMatch
        }
    }
}

impl From<BTreeMap<String, Vec<String>>> for PossibleTypes {
    fn from(map: BTreeMap<String, Vec<String>>) -> Self {
        Self {
            members: map
                .into_iter()
                .map(|(k, v)| (k, v.into_iter().collect()))
                .collect(),
        }
    }
}
