//! Core module
//!
//! Configuration, the simulation event stream, and time tracking

mod config;
mod events;
mod time;

pub use config::{ConfigError, SimConfig};
pub use events::{EventQueue, SimEvent};
pub use time::Time;
