//! CLI module
//!
//! The command-line interface for QueryMind: the REPL and its slash
//! command parsing.

pub mod commands;
pub mod repl;

pub use repl::Repl;
