//! Foundation types for the graph normalized cache (GNC).
//!
//! This crate provides the identity, addressing, and value types shared by
//! every other GNC crate. Nothing in here touches a store; it only describes
//! what a store holds and how its records are addressed.
//!
//! # Key Types
//!
//! - [`StoreKey`] -- Opaque key of a record in the normalized store
//! - [`StorePath`] -- Path from a record to a nested object, used for synthetic keys
//! - [`ResponsePath`] -- Path into a JSON response (response keys and list indices)
//! - [`FieldValue`] / [`FieldRecord`] -- Classified, flattened field contents
//! - [`IdentityResolver`] -- Maps raw response objects to stable store keys
//! - [`MissingField`] -- A hole found while writing or reading

pub mod canonical;
pub mod error;
pub mod identity;
pub mod key;
pub mod missing;
pub mod path;
pub mod value;

pub use canonical::{canonical_json, field_storage_name};
pub use error::TypeError;
pub use identity::{IdOnlyResolver, IdentityResolver, JsonObject, NoIdentity, TypenameIdResolver};
pub use key::{StoreKey, ROOT_MUTATION, ROOT_QUERY, ROOT_SUBSCRIPTION};
pub use missing::{json_type_name, MissingField, MissingReason};
pub use path::{PathSegment, ResponsePath, StorePath};
pub use value::{FieldRecord, FieldValue};
