//! Shared utilities for the to-do daemon
//!
//! This crate provides the process-level plumbing the daemon needs around its
//! core: the single-instance file lock, the default runtime paths, and the
//! tracing subscriber setup.

pub mod paths;
pub mod process_lock;
pub mod tracing;

pub use paths::*;
pub use process_lock::*;
