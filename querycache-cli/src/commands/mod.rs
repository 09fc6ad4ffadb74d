//! Subcommand implementations.

pub mod config;
pub mod init;
pub mod probe;
