mod objects;
mod errors;

pub use objects::*;
pub use errors::*;
