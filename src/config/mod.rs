mod app;
mod toggles;
mod announcements;
mod env;

pub use app::*;
pub use toggles::*;
pub use announcements::*;
