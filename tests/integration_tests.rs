//! Integration tests for the datetime MCP server
//!
//! These tests drive the full read-dispatch-write loop over in-memory streams.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Local, TimeZone};
use regex::Regex;
use serde_json::{json, Value};
use tokio::io::BufReader;

use mcp_datetime::config::Config;
use mcp_datetime::datetime::{Clock, DatetimeFormatter, FormatId, TemplateTable};
use mcp_datetime::error::{DatetimeMcpError, FormatError};
use mcp_datetime::mcp::server::McpServer;
use mcp_datetime::mcp::tools::ToolHandler;

/// Helper to create a JSON-RPC request line
fn make_request(id: i64, method: &str, params: Option<Value>) -> String {
    let mut request = json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
    });
    if let Some(p) = params {
        request["params"] = p;
    }
    format!("{}\n", request)
}

fn call_datetime(id: i64, arguments: Value) -> String {
    make_request(
        id,
        "tools/call",
        Some(json!({"name": "get_datetime", "arguments": arguments})),
    )
}

fn new_server() -> McpServer {
    let formatter = DatetimeFormatter::new(TemplateTable::new().expect("template table"));
    McpServer::new(Config::new(), ToolHandler::new(formatter))
}

/// Feed `input` to a fresh server and collect every response line
async fn exchange(input: &str) -> Vec<Value> {
    let mut server = new_server();
    let mut output = Vec::<u8>::new();
    server
        .run(BufReader::new(input.as_bytes()), &mut output)
        .await
        .expect("server loop");

    String::from_utf8(output)
        .expect("utf-8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Failed to parse JSON response"))
        .collect()
}

fn tool_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .expect("text content")
}

fn is_tool_error(response: &Value) -> bool {
    response["result"]["isError"] == json!(true)
}

/// Clock that advances one second per reading
struct SteppingClock {
    start: DateTime<Local>,
    ticks: AtomicI64,
}

impl SteppingClock {
    fn new() -> Self {
        Self {
            start: Local.with_ymd_and_hms(2024, 12, 10, 0, 54, 1).unwrap(),
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Local> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.start + Duration::seconds(tick)
    }
}

mod mcp_protocol_tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_handshake() {
        let input = format!(
            "{}{}",
            make_request(
                1,
                "initialize",
                Some(json!({
                    "protocolVersion": "2024-11-05",
                    "clientInfo": {"name": "test-client", "version": "1.0.0"},
                    "capabilities": {}
                }))
            ),
            "{\"jsonrpc\":\"2.0\",\"method\":\"notifications/initialized\"}\n"
        );

        let responses = exchange(&input).await;
        // The notification gets no reply.
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "mcp-datetime");
    }

    #[tokio::test]
    async fn test_list_tools_is_idempotent() {
        let input = format!(
            "{}{}{}",
            make_request(1, "tools/list", None),
            call_datetime(2, json!({"format": "date"})),
            make_request(3, "tools/list", None),
        );

        let responses = exchange(&input).await;
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["result"], responses[2]["result"]);

        let tools = responses[0]["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "get_datetime");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["format"]));
        assert_eq!(
            tools[0]["inputSchema"]["properties"]["format"]["type"],
            "string"
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_keeps_serving() {
        let input = format!(
            "{}{}",
            make_request(
                1,
                "tools/call",
                Some(json!({"name": "not_a_tool", "arguments": {}}))
            ),
            make_request(2, "ping", None),
        );

        let responses = exchange(&input).await;
        assert_eq!(responses.len(), 2);
        assert!(responses[0]["error"].is_null());
        assert!(is_tool_error(&responses[0]));
        assert!(tool_text(&responses[0]).contains("Unknown tool: not_a_tool"));
        assert_eq!(responses[1]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_missing_format_argument() {
        let responses = exchange(&call_datetime(1, json!({}))).await;
        assert!(is_tool_error(&responses[0]));
        assert!(tool_text(&responses[0]).contains("Missing required argument: format"));
    }

    #[tokio::test]
    async fn test_unknown_format_argument() {
        let responses = exchange(&call_datetime(1, json!({"format": "bogus"}))).await;
        assert!(is_tool_error(&responses[0]));
        assert!(tool_text(&responses[0]).contains("bogus"));
    }

    #[tokio::test]
    async fn test_iso_call() {
        let responses = exchange(&call_datetime(7, json!({"format": "iso"}))).await;
        assert_eq!(responses[0]["id"], 7);
        assert!(!is_tool_error(&responses[0]));

        let re = Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}[+-]\d{4}$").unwrap();
        assert!(re.is_match(tool_text(&responses[0])));
    }

    #[tokio::test]
    async fn test_garbage_line_then_recovery() {
        let input = format!("not json at all\n\n{}", make_request(2, "ping", None));

        let responses = exchange(&input).await;
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[1]["id"], 2);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let responses = exchange(&make_request(5, "resources/list", None)).await;
        assert_eq!(responses[0]["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_missing_method_keeps_id() {
        let input = "{\"jsonrpc\":\"2.0\",\"id\":9}\n";

        let responses = exchange(input).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 9);
        assert_eq!(responses[0]["error"]["code"], -32600);
    }

    #[tokio::test]
    async fn test_null_id_gets_invalid_request() {
        let input = format!(
            "{}{}",
            "{\"jsonrpc\":\"2.0\",\"id\":null,\"method\":\"tools/list\"}\n",
            make_request(2, "ping", None),
        );

        let responses = exchange(&input).await;
        assert_eq!(responses.len(), 2);
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[0]["error"]["code"], -32600);
        assert_eq!(responses[1]["id"], 2);
    }

    #[tokio::test]
    async fn test_float_id_is_echoed() {
        let input = "{\"jsonrpc\":\"2.0\",\"id\":1.5,\"method\":\"ping\"}\n";

        let responses = exchange(input).await;
        assert_eq!(responses[0]["id"], 1.5);
        assert_eq!(responses[0]["result"], json!({}));
    }

    #[tokio::test]
    async fn test_string_arguments_rejected() {
        let input = make_request(
            1,
            "tools/call",
            Some(json!({"name": "get_datetime", "arguments": "iso"})),
        );

        let responses = exchange(&input).await;
        assert!(is_tool_error(&responses[0]));
        assert!(tool_text(&responses[0]).contains("Invalid tool arguments"));
    }

    #[tokio::test]
    async fn test_empty_input_exits_cleanly() {
        assert!(exchange("").await.is_empty());
    }
}

mod stream_tests {
    use super::*;
    use std::io;

    #[test]
    fn test_response_written_per_request() {
        let mock = tokio_test::io::Builder::new()
            .read(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n")
            .write(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n")
            .build();
        let (reader, writer) = tokio::io::split(mock);

        let result = tokio_test::block_on(new_server().run(BufReader::new(reader), writer));
        assert!(result.is_ok());
    }

    #[test]
    fn test_read_failure_is_fatal() {
        let mock = tokio_test::io::Builder::new()
            .read_error(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            .build();

        let result = tokio_test::block_on(new_server().run(BufReader::new(mock), Vec::<u8>::new()));
        assert!(matches!(result, Err(DatetimeMcpError::Io(_))));
    }
}

mod format_engine_tests {
    use super::*;

    fn shape(id: FormatId) -> &'static str {
        match id {
            FormatId::Date => r"^\d{4}-\d{2}-\d{2}$",
            FormatId::DateSlash => r"^\d{4}/\d{2}/\d{2}$",
            FormatId::DateJp => r"^\d{4}年\d{2}月\d{2}日$",
            FormatId::Datetime => r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}$",
            FormatId::DatetimeJp => r"^\d{4}年\d{2}月\d{2}日 \d{2}時\d{2}分\d{2}秒$",
            FormatId::DatetimeT => r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}$",
            FormatId::Compact => r"^\d{14}$",
            FormatId::CompactDate => r"^\d{8}$",
            FormatId::CompactTime => r"^\d{6}$",
            FormatId::FilenameMd => r"^\d{14}\.md$",
            FormatId::FilenameTxt => r"^\d{14}\.txt$",
            FormatId::FilenameLog => r"^\d{14}\.log$",
            FormatId::Iso => r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}[+-]\d{4}$",
            FormatId::IsoBasic => r"^\d{8}T\d{6}[+-]\d{4}$",
            FormatId::Log => r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\.\d{6}$",
            FormatId::LogCompact => r"^\d{8}_\d{6}$",
            FormatId::Time => r"^\d{2}:\d{2}:\d{2}$",
            FormatId::TimeJp => r"^\d{2}時\d{2}分\d{2}秒$",
        }
    }

    #[test]
    fn test_every_format_matches_its_shape() {
        let formatter = DatetimeFormatter::new(TemplateTable::new().unwrap());
        for id in FormatId::ALL {
            let rendered = formatter.format(id.as_str()).unwrap();
            let re = Regex::new(shape(id)).unwrap();
            assert!(re.is_match(&rendered), "{} rendered as {:?}", id, rendered);
        }
    }

    #[test]
    fn test_examples_match_their_shape() {
        for id in FormatId::ALL {
            let re = Regex::new(shape(id)).unwrap();
            assert!(re.is_match(id.example()), "example for {}", id);
        }
    }

    #[test]
    fn test_bogus_format() {
        let formatter = DatetimeFormatter::new(TemplateTable::new().unwrap());
        let err = formatter.format("bogus").unwrap_err();
        assert_eq!(
            err,
            FormatError::UnknownFormat {
                format: "bogus".to_string()
            }
        );
    }

    #[test]
    fn test_time_reads_clock_each_call() {
        let formatter =
            DatetimeFormatter::with_clock(TemplateTable::new().unwrap(), SteppingClock::new());

        let first = formatter.format("time").unwrap();
        let second = formatter.format("time").unwrap();

        assert_eq!(first, "00:54:01");
        assert_eq!(second, "00:54:02");
        assert_eq!(first[..6], second[..6]);
    }

    #[tokio::test]
    async fn test_injected_clock_reaches_tool() {
        let formatter =
            DatetimeFormatter::with_clock(TemplateTable::new().unwrap(), SteppingClock::new());
        let mut server = McpServer::new(Config::new(), ToolHandler::new(formatter));

        let input = format!(
            "{}{}",
            call_datetime(1, json!({"format": "datetime_jp"})),
            call_datetime(2, json!({"format": "filename_md"})),
        );
        let mut output = Vec::<u8>::new();
        server
            .run(BufReader::new(input.as_bytes()), &mut output)
            .await
            .unwrap();

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(tool_text(&responses[0]), "2024年12月10日 00時54分01秒");
        assert_eq!(tool_text(&responses[1]), "20241210005402.md");
    }
}
