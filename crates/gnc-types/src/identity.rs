//! Entity identity resolution.
//!
//! The writer asks an [`IdentityResolver`] about every object it meets in a
//! response, including list elements. A key means "this is an entity, store
//! it once under this key"; `None` means the object is stored by location
//! instead.

use serde_json::Value;

use crate::key::StoreKey;
use crate::path::StorePath;

/// A JSON object as it appears in a response.
pub type JsonObject = serde_json::Map<String, Value>;

/// Maps a raw response object to a stable store key.
///
/// Implementations must be pure: the same object at the same path always
/// yields the same answer, and the same logical entity seen in two different
/// responses must yield the same key, or cross-query sharing breaks.
///
/// Any `Fn(&JsonObject, &StorePath) -> Option<StoreKey>` closure is a
/// resolver.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, object: &JsonObject, path: &StorePath) -> Option<StoreKey>;
}

impl<F> IdentityResolver for F
where
    F: Fn(&JsonObject, &StorePath) -> Option<StoreKey> + Send + Sync,
{
    fn resolve(&self, object: &JsonObject, path: &StorePath) -> Option<StoreKey> {
        self(object, path)
    }
}

/// Never assigns identity; everything is stored by location.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoIdentity;

impl IdentityResolver for NoIdentity {
    fn resolve(&self, _object: &JsonObject, _path: &StorePath) -> Option<StoreKey> {
        None
    }
}

/// Combines a type discriminator with an id field: `{"__typename": "Todo",
/// "id": 3}` becomes `Todo3` with the default (empty) separator.
///
/// The first present id field wins. Ids must be strings or integers; objects
/// missing either part get no identity.
#[derive(Clone, Debug)]
pub struct TypenameIdResolver {
    typename_field: String,
    id_fields: Vec<String>,
    separator: String,
}

impl TypenameIdResolver {
    pub fn new(
        typename_field: impl Into<String>,
        id_fields: Vec<String>,
        separator: impl Into<String>,
    ) -> Self {
        Self {
            typename_field: typename_field.into(),
            id_fields,
            separator: separator.into(),
        }
    }
}

impl Default for TypenameIdResolver {
    fn default() -> Self {
        Self::new("__typename", vec!["id".to_string()], "")
    }
}

impl IdentityResolver for TypenameIdResolver {
    fn resolve(&self, object: &JsonObject, _path: &StorePath) -> Option<StoreKey> {
        let typename = object.get(&self.typename_field)?.as_str()?;
        let id = self
            .id_fields
            .iter()
            .find_map(|field| object.get(field).and_then(id_text))?;
        Some(StoreKey::new(format!("{typename}{}{id}", self.separator)))
    }
}

/// Uses a globally unique id field as the key on its own.
#[derive(Clone, Debug)]
pub struct IdOnlyResolver {
    id_field: String,
}

impl IdOnlyResolver {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
        }
    }
}

impl IdentityResolver for IdOnlyResolver {
    fn resolve(&self, object: &JsonObject, _path: &StorePath) -> Option<StoreKey> {
        let id = object.get(&self.id_field).and_then(id_text)?;
        StoreKey::parse(&id).ok()
    }
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}
