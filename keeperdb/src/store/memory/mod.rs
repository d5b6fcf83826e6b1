mod config;
mod query_engine;
mod store;
mod transaction;

pub use config::*;
pub use store::*;
