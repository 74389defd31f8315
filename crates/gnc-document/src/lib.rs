//! Parsed GraphQL document model for the graph normalized cache.
//!
//! Documents arrive already parsed; this crate only models them and answers
//! the questions the writer and reader ask while walking one: which fields
//! apply to this object, what is the storage name of this field under these
//! variables, which operation is being executed.
//!
//! # Modules
//!
//! - [`document`] -- [`Document`], operations, fragment definitions
//! - [`selection`] -- [`SelectionSet`], [`Field`], fragments, field collection
//! - [`value`] -- [`ArgValue`] argument expressions and [`Variables`]
//! - [`directive`] -- `@skip` / `@include` evaluation
//! - [`possible_types`] -- type-condition matching for fragments

pub mod directive;
pub mod document;
pub mod error;
pub mod possible_types;
pub mod selection;
pub mod value;

pub use directive::{should_include, Directive};
pub use document::{
    Document, FragmentDefinition, OperationDefinition, OperationKind, VariableDefinition,
};
pub use error::{DocumentError, DocumentResult};
pub use possible_types::{PossibleTypes, TypeMatch};
pub use selection::{CollectedField, Field, FragmentSpread, InlineFragment, Selection, SelectionSet};
pub use value::{ArgValue, Variables};
