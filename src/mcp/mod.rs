//! MCP (Model Context Protocol) module
//!
//! Newline-delimited JSON-RPC server exposing the `get_datetime` tool.

pub mod server;
pub mod tools;
pub mod types;
