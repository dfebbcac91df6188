//! Database module
//!
//! This module provides connection management and query execution for the
//! backends the agent's operations run against.

pub mod connection;

// Re-exports
pub use connection::{DatabaseBackend, DatabasePool, QueryRows};
