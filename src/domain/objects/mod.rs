mod announcement;
mod content;

pub use announcement::*;
pub use content::*;
