pub mod sessions;
pub mod teas;
