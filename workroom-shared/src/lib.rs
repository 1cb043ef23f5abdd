//! # Workroom Shared Library
//!
//! Core types and logic shared across Workroom binaries: the data models,
//! the authentication and authorization layers, the project/task registry,
//! and the realtime room hub.
//!
//! ## Module Organization
//!
//! - `models` - database models and their SQL operations
//! - `auth` - passwords, session tokens, one-shot tokens, access rules
//! - `registry` - transactional project/task operations and event emission
//! - `realtime` - per-project broadcast rooms
//! - `db` - connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod realtime;
pub mod registry;

/// Crate version, from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
