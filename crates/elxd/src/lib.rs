//! elxd library - exposes modules for testing.

pub mod api;
pub mod cache;
pub mod cli;
pub mod collector;
pub mod config;
pub mod exposition;
pub mod server;
