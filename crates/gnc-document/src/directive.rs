//! Directive evaluation.
//!
//! Only the two executable directives that change the shape of a selection
//! are interpreted: `@skip(if:)` and `@include(if:)`. Any other directive is
//! carried along and ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DocumentError, DocumentResult};
use crate::value::{ArgValue, Variables};

/// A directive applied to a field or fragment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, ArgValue>,
}

impl Directive {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// `@skip(if: …)`
    pub fn skip_if(condition: impl Into<ArgValue>) -> Self {
        Self::new("skip").arg("if", condition)
    }

    /// `@include(if: …)`
    pub fn include_if(condition: impl Into<ArgValue>) -> Self {
        Self::new("include").arg("if", condition)
    }

    fn condition(&self, variables: &Variables) -> DocumentResult<bool> {
        let expr = self
            .arguments
            .get("if")
            .ok_or_else(|| DocumentError::InvalidDirectiveArgument {
                directive: self.name.clone(),
                reason: "missing `if` argument".into(),
            })?;
        match expr.resolve_argument(variables) {
            Some(Value::Bool(b)) => Ok(b),
            Some(other) => Err(DocumentError::InvalidDirectiveArgument {
                directive: self.name.clone(),
                reason: format!("`if` must be a boolean, got {other}"),
            }),
            None => Err(DocumentError::InvalidDirectiveArgument {
                directive: self.name.clone(),
                reason: "`if` refers to an unbound variable".into(),
            }),
        }
    }
}

/// Whether a selection carrying `directives` participates in execution.
pub fn should_include(directives: &[Directive], variables: &Variables) -> DocumentResult<bool> {
    for directive in directives {
        match directive.name.as_str() {
            "skip" if directive.condition(variables)? => return Ok(false),
            "include" if !directive.condition(variables)? => return Ok(false),
            _ => {}
        }
    }
    Ok(true)
}
