//! Single document read-modify-write transactions.
//!
//! The store owns atomicity and conflict retry; this module only defines the
//! handle a transaction function receives.

mod transaction;

pub use transaction::*;
