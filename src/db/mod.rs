mod connection;
mod migrations;

pub mod helpers;
pub mod models;
pub mod repositories;

pub use connection::Database;
pub use models::{NewTea, SessionEntry, SessionRecord, TeaItem};
