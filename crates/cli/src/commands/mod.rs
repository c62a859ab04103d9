//! Subcommand implementations.

pub mod seed;
pub mod snapshot;
