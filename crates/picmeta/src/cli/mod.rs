//! Command implementations for the picmeta CLI.

pub mod analyze;
pub mod config;
pub mod interactive;
