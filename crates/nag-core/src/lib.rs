#![forbid(unsafe_code)]
//! nag-core library: ownership resolution, digest aggregation, and
//! tracker-link rules for the nag report pipeline.
//!
//! # Conventions
//!
//! - **Errors**: `anyhow::Result` at fallible edges, `thiserror` enums at
//!   the library boundary.
//! - **Purity**: no clock reads and no I/O outside `config`; callers pass
//!   `now` and own the network.

pub mod config;
pub mod digest;
pub mod error;
pub mod event;
pub mod identity;
pub mod mention;
pub mod ownership;
pub mod summary;
pub mod tracker;
