//! Query construction.
//!
//! [`QueryBuilder`] accumulates [`Clause`]s against one collection and runs
//! them on demand. A finished [`Query`] is a plain value the store executes.

mod clause;
mod field;
mod query;
mod query_builder;

pub use clause::*;
pub use field::*;
pub use query::*;
pub use query_builder::*;
