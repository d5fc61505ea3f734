//! Connect, select, extract: one pass over a mailbox per run.

pub mod extractor;
#[cfg(test)]
pub mod fixtures;
pub mod models;
pub mod progress;
pub mod registry;
pub mod runner;
pub mod selector;
