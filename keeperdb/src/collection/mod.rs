//! Collections, documents and document references.
//!
//! A [`Collection`] binds a record type to the name of the bucket its
//! documents live in. Reads come back as [`DocumentSnapshot`]s (raw) or
//! [`Document`]s (decoded, with the store-assigned id attached).

mod collection;
mod document;
mod document_ref;

pub use collection::*;
pub use document::*;
pub use document_ref::*;
