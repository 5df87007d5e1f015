mod composer;
mod publisher;
mod cycle;
mod scheduler;

pub use composer::*;
pub use publisher::*;
pub use cycle::*;
pub use scheduler::*;
