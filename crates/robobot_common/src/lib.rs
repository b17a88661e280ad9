//! RoboBot Common - reply pipeline for the RoboBot chat service.
//!
//! Knowledge-base lookup, rule-based intents, the conversation log and the
//! mock/real mode gate. The HTTP surface lives in `robobotd`.

pub mod config;
pub mod conversation_log;
pub mod error;
pub mod intent;
pub mod knowledge;
pub mod matcher;
pub mod mode_gate;
pub mod provider;
pub mod random;
pub mod schemas;
pub mod types;

pub use error::{ChatError, Result};
pub use schemas::*;
pub use types::*;
