//! High-level API for the graph normalized cache.
//!
//! [`NormalizedCache`] ties the subsystems together behind one lock: the
//! writer normalizes query and mutation responses, the reader rebuilds query
//! results from the store, and the integrator applies mutation directives.
//! This is the entry point for applications embedding the cache.
//!
//! ```
//! use gnc_document::{Document, Field, SelectionSet, Variables};
//! use gnc_sdk::{CacheConfig, NormalizedCache};
//! use serde_json::json;
//!
//! let cache = NormalizedCache::new(CacheConfig::default()).unwrap();
//! let query = Document::query(SelectionSet::new().field(
//!     Field::new("viewer").select(
//!         SelectionSet::new()
//!             .field(Field::new("__typename"))
//!             .field(Field::new("id"))
//!             .field(Field::new("name")),
//!     ),
//! ));
//! let response = json!({"viewer": {"__typename": "User", "id": 1, "name": "Ada"}});
//!
//! cache.write_query(&query, None, &Variables::new(), &response).unwrap();
//! let outcome = cache.read_query(&query, None, &Variables::new()).unwrap();
//! assert!(outcome.complete);
//! assert_eq!(outcome.data, response);
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{MutationOutcome, NormalizedCache};
pub use config::{CacheConfig, IdentityConfig};
pub use error::{CacheError, CacheResult};

// Re-export key types
pub use gnc_document::{Document, Variables};
pub use gnc_mutation::{InsertPosition, IntegrationReport, MutationDirective};
pub use gnc_reader::ReadOutcome;
pub use gnc_store::{NormalizedStore, StorePatch};
pub use gnc_types::{FieldRecord, FieldValue, IdentityResolver, ResponsePath, StoreKey};
pub use gnc_writer::WriteReport;
