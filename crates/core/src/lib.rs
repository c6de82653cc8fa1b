//! Core domain types, errors, and constants for the to-do daemon.
//!
//! This crate holds the pieces that both the daemon process and the short-lived
//! command processes agree on.
//!
//! ## Key Components
//!
//! - **`errors`**: The `Error` enum, the `Result` alias and the `ErrorKind`
//!   classification that protocol layers translate into their own error codes.
//! - **`types`**: `Task` and its create/patch/update descriptors, the
//!   `FieldMask` update engine, and the `ServerStatus` discovery record.
//! - **`constants`**: File names, environment variable names and protocol
//!   paths shared between the daemon and its clients.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, ErrorKind, Result, ResultExt},
    types::*,
};
