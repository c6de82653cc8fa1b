//! Core domain types for the to-do daemon.
//!
//! - **`task`**: the `Task` record and the create/patch descriptors callers send
//! - **`field_mask`**: field names, `FieldMask`, and the update engine that turns
//!   a sparse patch plus a mask into a precise `TaskUpdate`
//! - **`status`**: the discovery record returned by the status RPC

pub mod field_mask;
pub mod status;
pub mod task;

pub use field_mask::*;
pub use status::*;
pub use task::*;
