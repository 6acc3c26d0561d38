//! # arbor-core
//!
//! Core types, node ids, and the session state machine for Arbor.
//!
//! This crate provides the foundational types shared across all Arbor crates:
//! - Entity structs for flow nodes and usage log entries
//! - The `NodeId` and `UserIdentifier` value types, normalized at the boundary
//! - `SessionState` and the pure `transition` function driving traversal
//! - Usage categories and ID prefix constants
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod session;
