//! Result reconstruction for the graph normalized cache.
//!
//! [`StoreReader`] answers a query purely from a
//! [`RecordStore`](gnc_store::RecordStore): it starts at the operation's root
//! record, follows references, and rebuilds the response shape the server
//! would have returned, reporting anything it could not supply.
//!
//! # Completeness
//!
//! - A field absent from its record is missing; the read is incomplete.
//! - A singular reference to an absent record is missing; the read is
//!   incomplete.
//! - A list element referencing an absent record is dropped from the list and
//!   listed in [`ReadOutcome::dropped`]; the read stays complete.

pub mod error;
pub mod outcome;
pub mod reader;

pub use error::{ReadError, ReadResult};
pub use outcome::{DroppedReference, ReadOutcome};
pub use reader::StoreReader;
