mod codec;
mod constants;
mod sort_order;
mod value;

pub use codec::*;
pub use constants::*;
pub use sort_order::*;
pub use value::*;
