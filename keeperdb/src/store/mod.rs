mod batch;
mod document_store;
pub mod memory;
mod write;

pub use batch::*;
pub use document_store::*;
pub use write::*;
