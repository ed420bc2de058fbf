//! CLI command handlers.

pub mod api;
pub mod config;
pub mod timeline;
