//! Datetime MCP Server - Rust Implementation
//!
//! A Model Context Protocol (MCP) server that formats the current local time
//! with one of a fixed set of named templates.

use clap::{Parser, Subcommand};
use tracing::Level;

use mcp_datetime::config::Config;
use mcp_datetime::datetime::{DatetimeFormatter, FormatId, TemplateTable};
use mcp_datetime::error::Result;
use mcp_datetime::mcp::server::McpServer;
use mcp_datetime::mcp::tools::ToolHandler;

/// Datetime MCP Server
#[derive(Parser)]
#[command(name = "mcp-datetime")]
#[command(author, version, about = "Datetime MCP Server - current time in named formats over MCP")]
struct Cli {
    /// Minimum log level (logs are written to stderr)
    #[arg(long, global = true, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current time in one format and exit
    Format {
        /// Format identifier, e.g. `iso` or `date_jp`
        format: String,
    },
    /// List every format identifier with an example
    Formats,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::new().with_log_level(cli.log_level);

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    config.validate()?;

    // Parse every template before serving anything
    let table = TemplateTable::new()?;
    let formatter = DatetimeFormatter::new(table);

    match cli.command {
        Some(Commands::Format { format }) => {
            println!("{}", formatter.format(&format)?);
        }
        Some(Commands::Formats) => {
            for id in FormatId::ALL {
                println!("{:<14}{}", id, id.example());
            }
        }
        None => {
            let mut server = McpServer::new(config, ToolHandler::new(formatter));
            server.run_stdio().await?;
        }
    }

    Ok(())
}
