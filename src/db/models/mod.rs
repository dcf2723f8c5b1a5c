pub mod session;
pub mod tea;

pub use session::{SessionEntry, SessionRecord};
pub use tea::{NewTea, TeaItem};
