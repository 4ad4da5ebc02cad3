//! Configuration, provider payload types and the clock abstraction

pub mod clock;
pub mod config;
pub mod models;
