//! QueryMind Library
//!
//! This is the library interface for QueryMind.
//! The main binary is in src/main.rs.

pub mod agent;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod llm;
pub mod tools;
