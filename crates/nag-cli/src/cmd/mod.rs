//! Subcommand implementations for the nag binary.

pub mod completions;
pub mod link_check;
pub mod report;
