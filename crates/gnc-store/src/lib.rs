//! Normalized record storage for the graph normalized cache.
//!
//! Every entity and every synthetic location lives as a flat
//! [`FieldRecord`](gnc_types::FieldRecord) under its
//! [`StoreKey`](gnc_types::StoreKey). Object-valued fields are stored as
//! references to other keys, so an entity reachable from many queries is
//! stored exactly once.
//!
//! # Storage Backends
//!
//! All backends implement the [`RecordStore`] trait:
//!
//! - [`NormalizedStore`] -- ordered in-memory store, snapshot-able as JSON
//!
//! # Design Rules
//!
//! 1. Writing an existing record is a field-level merge, never a replace.
//! 2. References are not validated on write; dangling references are legal.
//! 3. Removing a record never rewrites the records that refer to it.
//! 4. The store is cleared only by an explicit reset.

pub mod error;
pub mod integrity;
pub mod memory;
pub mod patch;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use integrity::{dangling_references, referrers, DanglingReference};
pub use memory::NormalizedStore;
pub use patch::StorePatch;
pub use traits::RecordStore;
