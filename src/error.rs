//! Error types for the datetime MCP server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the datetime MCP server
#[derive(Error, Debug)]
pub enum DatetimeMcpError {
    /// Template lookup and rendering errors
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// MCP protocol and tool invocation errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DatetimeMcpError {
    /// Short, stable label for log records
    pub fn kind(&self) -> &'static str {
        match self {
            DatetimeMcpError::Format(e) => e.kind(),
            DatetimeMcpError::Mcp(e) => e.kind(),
            DatetimeMcpError::Config(_) => "invalid_config",
            DatetimeMcpError::Io(_) => "io",
            DatetimeMcpError::Json(_) => "json",
        }
    }
}

/// Template lookup and rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Unknown format type: {format}")]
    UnknownFormat { format: String },

    #[error("Error formatting date with '{format}': {message}")]
    Formatting { format: String, message: String },

    #[error("Invalid template for '{format}': {pattern}")]
    InvalidTemplate { format: String, pattern: String },
}

impl FormatError {
    pub fn kind(&self) -> &'static str {
        match self {
            FormatError::UnknownFormat { .. } => "unknown_format",
            FormatError::Formatting { .. } => "formatting",
            FormatError::InvalidTemplate { .. } => "invalid_template",
        }
    }
}

/// MCP protocol errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum McpError {
    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Missing required argument: {name}")]
    MissingArgument { name: String },

    #[error("Invalid tool arguments: {message}")]
    InvalidArguments { message: String },
}

impl McpError {
    pub fn kind(&self) -> &'static str {
        match self {
            McpError::UnknownTool { .. } => "unknown_tool",
            McpError::MissingArgument { .. } => "missing_argument",
            McpError::InvalidArguments { .. } => "invalid_arguments",
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type alias for datetime MCP operations
pub type Result<T> = std::result::Result<T, DatetimeMcpError>;
