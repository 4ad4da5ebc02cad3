//! Orchestration of scheduled runs

pub mod actions;
pub mod handler;
pub mod runner;

pub use actions::{Action, ActionOutcome, CronReport};
pub use handler::{BotEvent, handle_event};
pub use runner::Runner;
