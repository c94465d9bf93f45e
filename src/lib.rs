//! fiksi client library
//!
//! Exposes the API client, its response cache, and the CLI pieces so that
//! integration tests can drive them directly.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
