//! Configuration for the datetime MCP server
//!
//! Server identity and logging level. Built from defaults and CLI flags;
//! nothing is read from disk.

use tracing::Level;

use crate::error::{ConfigError, Result};

/// Default server name reported during initialization
pub const DEFAULT_SERVER_NAME: &str = "mcp-datetime";

/// Configuration for the datetime MCP server
#[derive(Debug, Clone)]
pub struct Config {
    /// Name reported in `serverInfo`
    pub server_name: String,

    /// Version reported in `serverInfo`
    pub server_version: String,

    /// Minimum level for log output
    pub log_level: Level,
}

impl Config {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            server_name: DEFAULT_SERVER_NAME.to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: Level::INFO,
        }
    }

    /// Override the log level
    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// Check the configuration before the server starts
    pub fn validate(&self) -> Result<()> {
        if self.server_name.trim().is_empty() {
            return Err(ConfigError::InvalidConfig {
                message: "server name must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
