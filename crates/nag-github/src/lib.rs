#![forbid(unsafe_code)]
//! nag-github library: blocking platform client, paginated fetchers, and
//! the webhook payload decoder for the nag report pipeline.
//!
//! # Conventions
//!
//! - **Errors**: `FetchError` for everything that touches the wire;
//!   callers decide whether a failed repository is fatal.
//! - **Logging**: `tracing` macros; malformed feed records warn and skip.
//! - **Testing**: network code is exercised through [`transport::Transport`]
//!   with canned responses, never against the live API.

pub mod api;
pub mod client;
pub mod collect;
pub mod error;
pub mod time;
pub mod transport;
pub mod webhook;
