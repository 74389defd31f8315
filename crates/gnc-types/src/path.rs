//! Paths through responses and through the store.
//!
//! Two path flavors exist. A [`ResponsePath`] addresses a value inside a JSON
//! response using response keys (aliases) and list indices; it is what writers
//! and readers report holes against and what mutation directives point at. A
//! [`StorePath`] addresses a nested object relative to a store record using
//! storage field names; rendered with [`StorePath::to_key`] it becomes the
//! synthetic key of an identity-less list element.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::key::StoreKey;

/// One step of a path: a field name or a list index.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Field(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "{index}"),
            PathSegment::Field(name) => f.write_str(name),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

// ---------------------------------------------------------------------------
// StorePath
// ---------------------------------------------------------------------------

/// Location of a nested object relative to a store record.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StorePath {
    root: StoreKey,
    segments: Vec<PathSegment>,
}

impl StorePath {
    /// A path pointing at the record itself.
    pub fn new(root: StoreKey) -> Self {
        Self {
            root,
            segments: Vec::new(),
        }
    }

    /// Extend by a storage field name.
    pub fn field(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::Field(name.to_string()));
        next
    }

    /// Extend by a list index.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.segments.push(PathSegment::Index(index));
        next
    }

    pub fn root(&self) -> &StoreKey {
        &self.root
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Render the path as a store key: `root.segment.segment…`.
    ///
    /// Deterministic in the path alone, so rewriting the same response always
    /// lands identity-less objects in the same slots.
    pub fn to_key(&self) -> StoreKey {
        StoreKey::new(self.to_string())
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root.as_str())?;
        for segment in &self.segments {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ResponsePath
// ---------------------------------------------------------------------------

/// Location of a value inside a JSON response.
///
/// Serialized as a JSON array of segments (`["createTodo", "tags", 0]`). The
/// dotted text form (`createTodo.tags.0`) is accepted by [`ResponsePath::parse`];
/// all-digit segments are read as list indices.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponsePath(Vec<PathSegment>);

impl ResponsePath {
    /// The empty path (the response data object itself).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Parse the dotted text form. The empty string is the root path.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        if text.is_empty() {
            return Ok(Self::root());
        }
        let mut segments = Vec::new();
        for part in text.split('.') {
            if part.is_empty() {
                return Err(TypeError::InvalidPath {
                    path: text.to_string(),
                    reason: "path segments must not be empty".into(),
                });
            }
            let segment = if part.bytes().all(|b| b.is_ascii_digit()) {
                let index = part.parse::<usize>().map_err(|e| TypeError::InvalidPath {
                    path: text.to_string(),
                    reason: e.to_string(),
                })?;
                PathSegment::Index(index)
            } else {
                PathSegment::Field(part.to_string())
            };
            segments.push(segment);
        }
        Ok(Self(segments))
    }

    /// Extend by a response key.
    pub fn child_field(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Field(key.to_string()));
        next
    }

    /// Extend by a list index.
    pub fn child_index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Index(index));
        next
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ResponsePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for ResponsePath {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for ResponsePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_path_renders_synthetic_key() {
        let path = StorePath::new(StoreKey::root_query())
            .field("feed")
            .index(2)
            .field("author");
        assert_eq!(path.to_key().as_str(), "ROOT_QUERY.feed.2.author");
        assert_eq!(path.segments().len(), 3);
    }

    #[test]
    fn store_path_root() {
        let path = StorePath::new(StoreKey::from("Todo3"));
        assert!(path.segments().is_empty());
        assert_eq!(path.to_key(), StoreKey::from("Todo3"));
    }

    #[test]
    fn response_path_parse_and_display() {
        let path = ResponsePath::parse("createTodo.tags.0").unwrap();
        assert_eq!(
            path.segments(),
            &[
                PathSegment::Field("createTodo".into()),
                PathSegment::Field("tags".into()),
                PathSegment::Index(0),
            ]
        );
        assert_eq!(path.to_string(), "createTodo.tags.0");
    }

    #[test]
    fn response_path_empty_is_root() {
        let path = ResponsePath::parse("").unwrap();
        assert!(path.is_empty());
        assert_eq!(path, ResponsePath::root());
    }

    #[test]
    fn response_path_rejects_empty_segment() {
        assert!(matches!(
            ResponsePath::parse("a..b"),
            Err(TypeError::InvalidPath { .. })
        ));
        assert!(ResponsePath::parse(".a").is_err());
    }

    #[test]
    fn response_path_serde_is_segment_array() {
        let path: ResponsePath = ["createTodo"].into_iter().collect();
        let path = path.child_index(3);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["createTodo",3]"#);
        let parsed: ResponsePath = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, path);
    }

    #[test]
    fn child_paths_do_not_mutate_parent() {
        let parent = ResponsePath::parse("todoList").unwrap();
        let child = parent.child_field("todos").child_index(1);
        assert_eq!(parent.len(), 1);
        assert_eq!(child.to_string(), "todoList.todos.1");
    }
}
