//! Datetime MCP Server Library
//!
//! A Model Context Protocol (MCP) server exposing a single `get_datetime` tool
//! that formats the current local time with one of a fixed set of templates.

pub mod config;
pub mod datetime;
pub mod error;
pub mod mcp;

pub use config::Config;
pub use error::{DatetimeMcpError, Result};
