//! Mutation result integration for the graph normalized cache.
//!
//! A mutation's response is first written like any query response. The
//! [`Integrator`] then applies the [`MutationDirective`]s declared for that
//! invocation:
//!
//! - **array insert** -- put the object the mutation returned at the front or
//!   back of a list on another record;
//! - **delete** -- drop a record outright;
//! - **array delete** -- strip a reference out of a list.
//!
//! Directives run in declaration order. There is no rollback: a failed
//! directive is reported and skipped, the rest still apply.

pub mod directive;
pub mod error;
pub mod integrator;

pub use directive::{InsertPosition, MutationDirective};
pub use error::{MutationError, MutationResult};
pub use integrator::{DirectiveFailure, IntegrationReport, Integrator};
