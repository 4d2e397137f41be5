//! Wireline - HTTP/1.1 over raw TCP
//!
//! Request framing, response serialization and a task-per-connection server.

pub mod config;
pub mod http;
pub mod server;
