//! # Workroom API Server Library
//!
//! This library provides the HTTP surface of the Workroom server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `mail`: Outbound email delivery
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod mail;
pub mod routes;
