//! Event emitter client.
//!
//! Dials an event server over UDP, collects a fixed number of validated
//! events through [`emitter_core::collect_events`], and writes a plain-text
//! report of the most common credentials, user-agents, emails, and
//! submitters.

pub mod cli;
pub mod report;
mod run;

pub use cli::Args;
pub use run::{ClientError, run};
