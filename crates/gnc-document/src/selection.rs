//! Selection sets, fields and fragments, and field collection.

use std::collections::BTreeMap;

use gnc_types::field_storage_name;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::directive::{should_include, Directive};
use crate::document::Document;
use crate::error::{DocumentError, DocumentResult};
use crate::possible_types::{PossibleTypes, TypeMatch};
use crate::value::{ArgValue, Variables};

// ---------------------------------------------------------------------------
// Selection model
// ---------------------------------------------------------------------------

/// An ordered list of selections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    pub selections: Vec<Selection>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn field(mut self, field: Field) -> Self {
        self.selections.push(Selection::Field(field));
        self
    }

    /// Append an inline fragment.
    pub fn inline_fragment(mut self, fragment: InlineFragment) -> Self {
        self.selections.push(Selection::InlineFragment(fragment));
        self
    }

    /// Append a named fragment spread.
    pub fn spread(mut self, name: impl Into<String>) -> Self {
        self.selections
            .push(Selection::FragmentSpread(FragmentSpread::new(name)));
        self
    }

    pub fn push(&mut self, selection: Selection) {
        self.selections.push(selection);
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }
}

impl FromIterator<Field> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            selections: iter.into_iter().map(Selection::Field).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    Field(Field),
    InlineFragment(InlineFragment),
    FragmentSpread(FragmentSpread),
}

/// A selected field, optionally aliased, with arguments and a sub-selection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub arguments: BTreeMap<String, ArgValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_set: Option<SelectionSet>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: BTreeMap::new(),
            directives: Vec::new(),
            selection_set: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    /// Give the field a sub-selection.
    pub fn select(mut self, selection_set: SelectionSet) -> Self {
        self.selection_set = Some(selection_set);
        self
    }

    /// Key under which the field appears in a response: alias or name.
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Arguments bound to concrete values; unbound variable arguments drop out.
    pub fn resolved_arguments(&self, variables: &Variables) -> BTreeMap<String, Value> {
        self.arguments
            .iter()
            .filter_map(|(name, expr)| {
                expr.resolve_argument(variables)
                    .map(|value| (name.clone(), value))
            })
            .collect()
    }

    /// Name under which the field is stored in a record.
    pub fn storage_name(&self, variables: &Variables) -> String {
        field_storage_name(&self.name, &self.resolved_arguments(variables))
    }
}

/// `... on Type { … }` or `... @directive { … }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InlineFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    pub selection_set: SelectionSet,
}

impl InlineFragment {
    pub fn on(type_condition: impl Into<String>, selection_set: SelectionSet) -> Self {
        Self {
            type_condition: Some(type_condition.into()),
            directives: Vec::new(),
            selection_set,
        }
    }

    pub fn untyped(selection_set: SelectionSet) -> Self {
        Self {
            type_condition: None,
            directives: Vec::new(),
            selection_set,
        }
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }
}

/// `...FragmentName`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FragmentSpread {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
}

impl FragmentSpread {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            directives: Vec::new(),
        }
    }

    pub fn directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }
}

// ---------------------------------------------------------------------------
// Field collection
// ---------------------------------------------------------------------------

/// A field that applies to an object, after directives and fragments.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollectedField<'a> {
    pub field: &'a Field,
    /// Reached through a fragment whose type condition could not be checked
    /// because the object's typename is unknown.
    pub heuristic: bool,
}

impl Document {
    /// Flatten `selection_set` into the fields that apply to an object of
    /// type `typename`, in document order.
    ///
    /// Fields excluded by `@skip`/`@include` are dropped, fragments whose
    /// type condition does not match are skipped. The same response key may
    /// appear more than once; callers merge the sub-selections.
    pub fn collect_fields<'a>(
        &'a self,
        selection_set: &'a SelectionSet,
        typename: Option<&str>,
        possible_types: &PossibleTypes,
        variables: &Variables,
    ) -> DocumentResult<Vec<CollectedField<'a>>> {
        let mut collector = Collector {
            document: self,
            typename,
            possible_types,
            variables,
            spread_stack: Vec::new(),
            out: Vec::new(),
        };
        collector.collect(selection_set, false)?;
        Ok(collector.out)
    }
}

struct Collector<'a, 'b> {
    document: &'a Document,
    typename: Option<&'b str>,
    possible_types: &'b PossibleTypes,
    variables: &'b Variables,
    spread_stack: Vec<&'a str>,
    out: Vec<CollectedField<'a>>,
}

impl<'a, 'b> Collector<'a, 'b> {
    fn collect(&mut self, selection_set: &'a SelectionSet, heuristic: bool) -> DocumentResult<()> {
        for selection in &selection_set.selections {
            match selection {
                Selection::Field(field) => {
                    if should_include(&field.directives, self.variables)? {
                        self.out.push(CollectedField { field, heuristic });
                    }
                }
                Selection::InlineFragment(fragment) => {
                    if !should_include(&fragment.directives, self.variables)? {
                        continue;
                    }
                    let matched = match &fragment.type_condition {
                        Some(condition) => self.type_match(condition),
                        None => TypeMatch::Match,
                    };
                    match matched {
                        TypeMatch::Match => self.collect(&fragment.selection_set, heuristic)?,
                        TypeMatch::Unknown => self.collect(&fragment.selection_set, true)?,
                        TypeMatch::NoMatch => {}
                    }
                }
                Selection::FragmentSpread(spread) => {
                    if !should_include(&spread.directives, self.variables)? {
                        continue;
                    }
                    let definition = self.document.fragment(&spread.name)?;
                    if self.spread_stack.contains(&definition.name.as_str()) {
                        return Err(DocumentError::FragmentCycle(definition.name.clone()));
                    }
                    let matched = self.type_match(&definition.type_condition);
                    if matched == TypeMatch::NoMatch {
                        continue;
                    }
                    self.spread_stack.push(&definition.name);
                    let result = self.collect(
                        &definition.selection_set,
                        heuristic || matched == TypeMatch::Unknown,
                    );
                    self.spread_stack.pop();
                    result?;
                }
            }
        }
        Ok(())
    }

    fn type_match(&self, condition: &str) -> TypeMatch {
        self.possible_types.matches(condition, self.typename)
    }
}
