//! Command-line front end of the to-do daemon
//!
//! `run` starts the daemon in the foreground; every other command is a
//! short-lived process that connects to the daemon's RPC socket, issues one
//! request and prints the outcome.

pub mod cli;
pub mod commands;
pub mod formatters;

pub use cli::Cli;
pub use commands::Commands;
