//! Response normalization for the graph normalized cache.
//!
//! [`StoreWriter`] flattens a GraphQL response into a
//! [`RecordStore`](gnc_store::RecordStore), guided by the document that
//! produced it:
//!
//! - fields are read from the response by alias and stored by storage name
//!   (field name plus canonical arguments);
//! - scalars are stored verbatim;
//! - objects with identity become records of their own, referenced from the
//!   parent slot;
//! - identity-less list elements get a key derived from their location;
//! - identity-less singular objects are inlined into the parent record.
//!
//! Missing or mis-shaped fields never abort a write. They are listed in the
//! [`WriteReport`] and the affected subtree is simply not written.

pub mod error;
pub mod report;
pub mod writer;

pub use error::{WriteError, WriteResult};
pub use report::WriteReport;
pub use writer::StoreWriter;
