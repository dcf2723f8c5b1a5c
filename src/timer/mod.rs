pub mod commands;
pub mod controller;
pub mod state;
pub mod ticker;

pub use controller::{BrewController, BrewEvent, Cues};
pub use state::{BrewSession, SessionPhase, SessionRequest, SummaryView, TimerMode};
