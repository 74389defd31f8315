use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use gnc_document::PossibleTypes;
use gnc_types::{IdOnlyResolver, IdentityResolver, NoIdentity, TypenameIdResolver};
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, CacheResult};

/// Configuration for a [`NormalizedCache`](crate::NormalizedCache).
///
/// Every field has a default, so an empty TOML file is a valid config.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// When `false`, incomplete reads fail instead of returning partial data.
    pub return_partial_data: bool,
    /// How response objects are assigned store keys.
    pub identity: IdentityConfig,
    /// Abstract type name to concrete member types, for fragment matching.
    pub possible_types: BTreeMap<String, Vec<String>>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            return_partial_data: true,
            identity: IdentityConfig::default(),
            possible_types: BTreeMap::new(),
        }
    }
}

impl CacheConfig {
    pub fn from_toml_str(text: &str) -> CacheResult<Self> {
        let config: CacheConfig =
            toml::from_str(text).map_err(|e| CacheError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> CacheResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> CacheResult<String> {
        toml::to_string(self).map_err(|e| CacheError::Config(e.to_string()))
    }

    pub fn validate(&self) -> CacheResult<()> {
        match &self.identity {
            IdentityConfig::TypenameAndId {
                typename_field,
                id_fields,
                ..
            } => {
                if typename_field.is_empty() {
                    return Err(CacheError::Config("identity.typename_field is empty".into()));
                }
                if id_fields.is_empty() || id_fields.iter().any(String::is_empty) {
                    return Err(CacheError::Config(
                        "identity.id_fields must name at least one non-empty field".into(),
                    ));
                }
            }
            IdentityConfig::IdOnly { id_field } if id_field.is_empty() => {
                return Err(CacheError::Config("identity.id_field is empty".into()));
            }
            _ => {}
        }
        Ok(())
    }

    pub fn possible_types(&self) -> PossibleTypes {
        PossibleTypes::from(self.possible_types.clone())
    }
}

/// Built-in identity strategies.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum IdentityConfig {
    /// No object has identity; everything is stored by location.
    None,
    /// `typename + separator + id`, e.g. `Todo3`.
    TypenameAndId {
        #[serde(default = "default_typename_field")]
        typename_field: String,
        #[serde(default = "default_id_fields")]
        id_fields: Vec<String>,
        #[serde(default)]
        separator: String,
    },
    /// A globally unique id used as the key on its own.
    IdOnly {
        #[serde(default = "default_id_field")]
        id_field: String,
    },
}

impl Default for IdentityConfig {
    fn default() -> Self {
        IdentityConfig::TypenameAndId {
            typename_field: default_typename_field(),
            id_fields: default_id_fields(),
            separator: String::new(),
        }
    }
}

impl IdentityConfig {
    pub fn build_resolver(&self) -> Arc<dyn IdentityResolver> {
        match self {
            IdentityConfig::None => Arc::new(NoIdentity),
            IdentityConfig::TypenameAndId {
                typename_field,
                id_fields,
                separator,
            } => Arc::new(TypenameIdResolver::new(
                typename_field.clone(),
                id_fields.clone(),
                separator.clone(),
            )),
            IdentityConfig::IdOnly { id_field } => Arc::new(IdOnlyResolver::new(id_field.clone())),
        }
    }
}

fn default_typename_field() -> String {
    "__typename".to_string()
}

fn default_id_fields() -> Vec<String> {
    vec!["id".to_string()]
}

fn default_id_field() -> String {
    "id".to_string()
}
