// ABOUTME: Library root for clusterops - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod executor;
pub mod meta;
pub mod operation;
pub mod output;
pub mod pd;
pub mod ssh;
pub mod task;
pub mod types;
