//! MCP Server implementation
//!
//! Implements the Model Context Protocol server over newline-delimited
//! JSON-RPC on a pair of byte streams (stdio in production).

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::config::Config;
use crate::datetime::{Clock, SystemClock};
use crate::error::Result;
use crate::mcp::tools::ToolHandler;
use crate::mcp::types::*;

/// MCP Server for datetime formatting
pub struct McpServer<C = SystemClock> {
    /// Server identity
    config: Config,

    /// Tool handler
    tool_handler: ToolHandler<C>,

    /// Whether the client sent `notifications/initialized`
    initialized: bool,
}

impl<C: Clock> McpServer<C> {
    /// Create a new MCP server
    pub fn new(config: Config, tool_handler: ToolHandler<C>) -> Self {
        Self {
            config,
            tool_handler,
            initialized: false,
        }
    }

    /// Whether the initialization handshake has completed
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server on stdio
    pub async fn run_stdio(&mut self) -> Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();

        self.run(reader, writer).await
    }

    /// Serve requests until the reader reaches EOF
    ///
    /// Each request is answered and flushed before the next line is read.
    /// Stream errors end the loop; request-level failures never do.
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(
            server = %self.config.server_name,
            version = %self.config.server_version,
            "MCP server ready"
        );

        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            if let Some(response) = self.handle_message(&line) {
                let mut response_str = serde_json::to_string(&response)?;
                response_str.push('\n');
                writer.write_all(response_str.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        tracing::info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle an incoming JSON-RPC message
    ///
    /// Returns `None` for notifications, which get no response.
    pub fn handle_message(&mut self, message: &str) -> Option<JsonRpcResponse> {
        let request = match parse_request(message) {
            Ok(req) => req,
            Err(response) => return Some(response),
        };

        tracing::debug!(method = %request.method, id = ?request.id, "Received message");

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }
        let id = request.id.clone()?;

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                Some(id),
                JsonRpcError::invalid_request(format!(
                    "Unsupported jsonrpc version: {}",
                    request.jsonrpc
                )),
            ));
        }

        let result = match request.method.as_str() {
            methods::INITIALIZE => to_result(self.handle_initialize(&request)),
            methods::PING => Ok(serde_json::json!({})),
            methods::LIST_TOOLS => to_result(self.handle_list_tools()),
            methods::CALL_TOOL => to_result(self.handle_call_tool(&request)),
            _ => {
                tracing::warn!(method = %request.method, "Method not found");
                return Some(JsonRpcResponse::error(
                    Some(id),
                    JsonRpcError::method_not_found(&request.method),
                ));
            }
        };

        Some(match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => {
                tracing::error!(method = %request.method, "Failed to encode result: {}", e);
                JsonRpcResponse::error(Some(id), JsonRpcError::internal_error(e.to_string()))
            }
        })
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            methods::INITIALIZED => {
                self.initialized = true;
                tracing::info!("Client initialized");
            }
            other => tracing::debug!(method = other, "Ignoring notification"),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, request: &JsonRpcRequest) -> InitializeResult {
        let params: InitializeParams = request
            .params
            .clone()
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();

        if let Some(client) = &params.client_info {
            tracing::info!(client = %client.name, version = ?client.version, "Initialize");
        }

        InitializeResult {
            protocol_version: negotiate_version(params.protocol_version.as_deref()).to_string(),
            server_info: ServerInfo {
                name: self.config.server_name.clone(),
                version: self.config.server_version.clone(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
            },
        }
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> ListToolsResult {
        ListToolsResult {
            tools: self.tool_handler.list_tools(),
        }
    }

    /// Handle call tool request
    fn handle_call_tool(&self, request: &JsonRpcRequest) -> CallToolResult {
        let params: CallToolParams = match request.params.as_ref() {
            Some(p) => match serde_json::from_value(p.clone()) {
                Ok(params) => params,
                Err(e) => {
                    tracing::warn!("Invalid tool parameters: {}", e);
                    return CallToolResult::error(format!("Invalid tool parameters: {}", e));
                }
            },
            None => {
                tracing::warn!("Missing tool parameters");
                return CallToolResult::error("Missing tool parameters");
            }
        };

        self.tool_handler.call_tool(&params.name, params.arguments)
    }
}

/// Parse one line into a request, or the error response it deserves
///
/// Only text that is not JSON gets `-32700`. Well-formed JSON that is not a
/// valid request gets `-32600`, echoing its `id` whenever one can be read.
/// A message is a notification only when the `id` key is absent.
fn parse_request(message: &str) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    let value: Value = serde_json::from_str(message).map_err(|e| {
        tracing::warn!("Unparseable message: {}", e);
        JsonRpcResponse::error(None, JsonRpcError::parse_error(format!("Parse error: {}", e)))
    })?;

    let invalid = |id: Option<RequestId>, message: String| {
        tracing::warn!(id = ?id, "Invalid request: {}", message);
        JsonRpcResponse::error(id, JsonRpcError::invalid_request(message))
    };

    let Some(fields) = value.as_object() else {
        return Err(invalid(None, "request must be a JSON object".to_string()));
    };

    let id = match fields.get("id") {
        None => None,
        Some(Value::Null) => {
            return Err(invalid(None, "request id must not be null".to_string()));
        }
        Some(raw) => match serde_json::from_value::<RequestId>(raw.clone()) {
            Ok(id) => Some(id),
            Err(_) => {
                return Err(invalid(
                    None,
                    format!("request id must be a string or number, got {}", raw),
                ));
            }
        },
    };

    serde_json::from_value::<JsonRpcRequest>(value)
        .map_err(|e| invalid(id, e.to_string()))
}

/// Echo the client's protocol version when supported, else offer the latest
fn negotiate_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_MCP_VERSIONS.iter().copied().find(|s| *s == v))
        .unwrap_or(MCP_VERSION)
}

fn to_result<T: Serialize>(value: T) -> serde_json::Result<Value> {
    serde_json::to_value(value)
}
