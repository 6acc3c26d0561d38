//! Repository modules implementing the Arbor persistence operations.
//!
//! Each module adds methods to `ArborService` via `impl ArborService` blocks.

pub mod flow;
pub mod usage;
