//! MCP Tool definitions and handlers
//!
//! Defines the `get_datetime` tool and dispatches invocations to the
//! format engine.

use serde_json::{json, Value};

use crate::datetime::{Clock, DatetimeFormatter, FormatId, SystemClock};
use crate::error::{DatetimeMcpError, McpError};
use crate::mcp::types::{CallToolResult, Tool};

/// Name of the only tool this server exposes
pub const GET_DATETIME: &str = "get_datetime";

/// Argument carrying the template identifier
const FORMAT_ARG: &str = "format";

/// Tool handler
pub struct ToolHandler<C = SystemClock> {
    formatter: DatetimeFormatter<C>,
    tools: Vec<Tool>,
}

impl<C: Clock> ToolHandler<C> {
    /// Create a new tool handler
    pub fn new(formatter: DatetimeFormatter<C>) -> Self {
        Self {
            formatter,
            tools: vec![get_datetime_tool()],
        }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools.clone()
    }

    /// Call a tool by name, turning every failure into an error result
    pub fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        match self.dispatch(name, &args) {
            Ok(text) => CallToolResult::text(text),
            Err(e) => {
                let kind = e.kind();
                match &e {
                    DatetimeMcpError::Mcp(_) => {
                        tracing::warn!(tool = name, kind, "Tool call rejected: {}", e)
                    }
                    _ => tracing::error!(tool = name, kind, "Tool call failed: {}", e),
                }
                CallToolResult::error(tool_error_message(&e))
            }
        }
    }

    fn dispatch(&self, name: &str, args: &Value) -> Result<String, DatetimeMcpError> {
        match name {
            GET_DATETIME => self.handle_get_datetime(args),
            _ => Err(McpError::UnknownTool {
                name: name.to_string(),
            }
            .into()),
        }
    }

    // ==================== Tool Handlers ====================

    fn handle_get_datetime(&self, args: &Value) -> Result<String, DatetimeMcpError> {
        if !matches!(args, Value::Object(_) | Value::Null) {
            return Err(McpError::InvalidArguments {
                message: format!("arguments must be an object, got {}", args),
            }
            .into());
        }

        let format = match args.get(FORMAT_ARG) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.as_str()),
            Some(other) => {
                return Err(McpError::InvalidArguments {
                    message: format!("'{}' must be a string, got {}", FORMAT_ARG, other),
                }
                .into())
            }
        };

        let format = format.filter(|f| !f.is_empty()).ok_or_else(|| McpError::MissingArgument {
            name: FORMAT_ARG.to_string(),
        })?;

        let formatted = self.formatter.format(format)?;
        tracing::debug!(format, result = %formatted, "Formatted datetime");
        Ok(formatted)
    }
}

/// Client-facing text for a failed tool call, without the crate-level prefix
fn tool_error_message(err: &DatetimeMcpError) -> String {
    match err {
        DatetimeMcpError::Format(e) => e.to_string(),
        DatetimeMcpError::Mcp(e) => e.to_string(),
        other => other.to_string(),
    }
}

// ==================== Tool Schemas ====================

fn get_datetime_tool() -> Tool {
    Tool {
        name: GET_DATETIME.to_string(),
        description: Some("Get current date and time in various formats".to_string()),
        input_schema: get_datetime_schema(),
    }
}

fn get_datetime_schema() -> Value {
    let names: Vec<&str> = FormatId::ALL.iter().map(|id| id.as_str()).collect();

    let mut description = String::from("Available formats:\n");
    for id in FormatId::ALL {
        description.push_str(&format!("- {}: {}\n", id, id.example()));
    }

    json!({
        "type": "object",
        "properties": {
            "format": {
                "type": "string",
                "description": description,
                "enum": names
            }
        },
        "required": ["format"]
    })
}
