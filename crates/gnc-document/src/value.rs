//! Argument expressions and their resolution against variables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Variable bindings for one execution of a document.
pub type Variables = serde_json::Map<String, Value>;

/// An argument expression as written in a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgValue {
    Variable(String),
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    Enum(String),
    List(Vec<ArgValue>),
    Object(BTreeMap<String, ArgValue>),
}

impl ArgValue {
    pub fn variable(name: impl Into<String>) -> Self {
        ArgValue::Variable(name.into())
    }

    pub fn enum_value(name: impl Into<String>) -> Self {
        ArgValue::Enum(name.into())
    }

    /// Resolve to a JSON value. Unbound variables become `null`.
    pub fn resolve(&self, variables: &Variables) -> Value {
        match self {
            ArgValue::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
            ArgValue::Null => Value::Null,
            ArgValue::Boolean(b) => Value::Bool(*b),
            ArgValue::Int(i) => Value::Number((*i).into()),
            ArgValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            ArgValue::String(s) | ArgValue::Enum(s) => Value::String(s.clone()),
            ArgValue::List(items) => {
                Value::Array(items.iter().map(|item| item.resolve(variables)).collect())
            }
            ArgValue::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.resolve(variables)))
                    .collect(),
            ),
        }
    }

    /// Resolve in argument position.
    ///
    /// An argument that is a bare variable with no binding counts as not
    /// provided and yields `None`; nested unbound variables resolve to `null`.
    pub fn resolve_argument(&self, variables: &Variables) -> Option<Value> {
        match self {
            ArgValue::Variable(name) => variables.get(name).cloned(),
            other => Some(other.resolve(variables)),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(b: bool) -> Self {
        ArgValue::Boolean(b)
    }
}

impl From<i64> for ArgValue {
    fn from(i: i64) -> Self {
        ArgValue::Int(i)
    }
}

impl From<i32> for ArgValue {
    fn from(i: i32) -> Self {
        ArgValue::Int(i64::from(i))
    }
}

impl From<f64> for ArgValue {
    fn from(f: f64) -> Self {
        ArgValue::Float(f)
    }
}

impl From<&str> for ArgValue {
    fn from(s: &str) -> Self {
        ArgValue::String(s.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(s: String) -> Self {
        ArgValue::String(s)
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(items: Vec<T>) -> Self {
        ArgValue::List(items.into_iter().map(Into::into).collect())
    }
}
