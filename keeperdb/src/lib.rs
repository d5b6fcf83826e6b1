//! # keeperdb - typed repositories over a document store
//!
//! keeperdb is a data-access layer for schema-less document stores. It gives
//! each collection a typed repository with point operations, conjunctive
//! filtering and transactions, plus a persistent query builder for filter,
//! ordering, page cap and cursor clauses.
//!
//! ## Key Features
//!
//! - **Typed collections**: a [`Collection<T>`](collection::Collection) binds a
//!   record type to a collection name, usually as a `const`
//! - **Explicit store injection**: every repository talks to the
//!   [`DocumentStore`](store::DocumentStore) it was built with
//! - **Branchable queries**: builder calls never mutate the receiver
//! - **Writes**: merge and overwrite semantics, batches and field sentinels
//! - **Transactions**: store managed read-modify-write with conflict retry
//! - **In-memory store**: a complete store implementation for tests and tools
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use keeperdb::collection::Collection;
//! use keeperdb::database::Database;
//! use keeperdb::query::FilterOperator;
//!
//! const PRICING: Collection<Pricing> = Collection::new("pricing");
//!
//! let db = Database::builder().open()?;
//! let repo = db.repository(&PRICING);
//! repo.replace("p1", &Pricing { tier: "gold".into(), price: 10 }).await?;
//!
//! let gold = repo
//!     .query_builder()
//!     .filter("tier", FilterOperator::Equal, "gold")
//!     .order_by("price")
//!     .limit(10)
//!     .query()
//!     .await?;
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - Collections, documents and document references
//! - [`common`] - Raw values, field paths, codecs and constants
//! - [`database`] - The database handle
//! - [`db_builder`] - Database builder
//! - [`db_config`] - Database configuration
//! - [`errors`] - Error types and result definitions
//! - [`query`] - Clauses, queries and the query builder
//! - [`repository`] - Typed collection repositories
//! - [`store`] - Store contract, writes, batches and the in-memory store
//! - [`transaction`] - Transaction handles

pub mod collection;
pub mod common;
pub mod database;
pub mod db_builder;
pub mod db_config;
pub mod errors;
pub mod query;
pub mod repository;
pub mod store;
pub mod transaction;
