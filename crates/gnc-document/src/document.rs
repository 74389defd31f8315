//! Documents, operations and fragment definitions.

use std::collections::BTreeMap;

use gnc_types::StoreKey;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DocumentError, DocumentResult};
use crate::selection::SelectionSet;
use crate::value::Variables;

/// Operation type, which also fixes the root record an operation starts at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn root_key(self) -> StoreKey {
        match self {
            OperationKind::Query => StoreKey::root_query(),
            OperationKind::Mutation => StoreKey::root_mutation(),
            OperationKind::Subscription => StoreKey::root_subscription(),
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
            OperationKind::Subscription => write!(f, "subscription"),
        }
    }
}

/// `$name: Type = default`; the type is not modelled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationDefinition {
    pub kind: OperationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variable_definitions: Vec<VariableDefinition>,
    pub selection_set: SelectionSet,
}

impl OperationDefinition {
    pub fn new(kind: OperationKind, selection_set: SelectionSet) -> Self {
        Self {
            kind,
            name: None,
            variable_definitions: Vec::new(),
            selection_set,
        }
    }

    pub fn query(selection_set: SelectionSet) -> Self {
        Self::new(OperationKind::Query, selection_set)
    }

    pub fn mutation(selection_set: SelectionSet) -> Self {
        Self::new(OperationKind::Mutation, selection_set)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declare a variable, optionally with a default.
    pub fn variable(mut self, name: impl Into<String>, default_value: Option<Value>) -> Self {
        self.variable_definitions.push(VariableDefinition {
            name: name.into(),
            default_value,
        });
        self
    }

    pub fn root_key(&self) -> StoreKey {
        self.kind.root_key()
    }

    /// Caller variables with declared defaults filled in for unbound names.
    pub fn effective_variables(&self, variables: &Variables) -> Variables {
        let mut effective = variables.clone();
        for definition in &self.variable_definitions {
            if let Some(default) = &definition.default_value {
                effective
                    .entry(definition.name.clone())
                    .or_insert_with(|| default.clone());
            }
        }
        effective
    }
}

/// `fragment Name on Type { … }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: String,
    pub selection_set: SelectionSet,
}

impl FragmentDefinition {
    pub fn new(
        name: impl Into<String>,
        type_condition: impl Into<String>,
        selection_set: SelectionSet,
    ) -> Self {
        Self {
            name: name.into(),
            type_condition: type_condition.into(),
            selection_set,
        }
    }
}

/// An already-parsed executable document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub operations: Vec<OperationDefinition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fragments: BTreeMap<String, FragmentDefinition>,
}

impl Document {
    /// A document holding a single anonymous query.
    pub fn query(selection_set: SelectionSet) -> Self {
        Self::default().with_operation(OperationDefinition::query(selection_set))
    }

    /// A document holding a single anonymous mutation.
    pub fn mutation(selection_set: SelectionSet) -> Self {
        Self::default().with_operation(OperationDefinition::mutation(selection_set))
    }

    pub fn with_operation(mut self, operation: OperationDefinition) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn with_fragment(mut self, fragment: FragmentDefinition) -> Self {
        self.fragments.insert(fragment.name.clone(), fragment);
        self
    }

    /// Declare a variable on every operation in the document.
    pub fn with_variable(mut self, name: impl Into<String>, default_value: Option<Value>) -> Self {
        let name = name.into();
        for operation in &mut self.operations {
            operation.variable_definitions.push(VariableDefinition {
                name: name.clone(),
                default_value: default_value.clone(),
            });
        }
        self
    }

    /// Select the operation to execute.
    ///
    /// Without a name the document must hold exactly one operation.
    pub fn operation(&self, name: Option<&str>) -> DocumentResult<&OperationDefinition> {
        match name {
            Some(name) => self
                .operations
                .iter()
                .find(|op| op.name.as_deref() == Some(name))
                .ok_or_else(|| DocumentError::UnknownOperation(name.to_string())),
            None => match self.operations.as_slice() {
                [] => Err(DocumentError::NoOperation),
                [only] => Ok(only),
                many => Err(DocumentError::AmbiguousOperation { count: many.len() }),
            },
        }
    }

    pub fn fragment(&self, name: &str) -> DocumentResult<&FragmentDefinition> {
        self.fragments
            .get(name)
            .ok_or_else(|| DocumentError::UnknownFragment(name.to_string()))
    }
}
