//! Core business logic - store operations and the assignment engine.
//!
//! `computer` and `employee` are thin, connection-generic store helpers that work on
//! either a pooled connection or an open transaction. `assignment` combines them with
//! the cache tier and the notifier into the multi-step workflows callers use.

/// Assignment engine - create, look up, reassign, and delete computers
pub mod assignment;
/// Computer and ownership-link store operations
pub mod computer;
/// Employee store operations
pub mod employee;

pub use assignment::{AssignmentEngine, Reassignment};
pub use computer::NewComputer;
pub use employee::NewEmployee;
