//! server
//!
//! Line-delimited JSON-RPC 2.0 over stdio.
//!
//! One JSON message per line. Requests are handled one at a time, in
//! arrival order, and each gets exactly one response line. Notifications
//! (messages without an `id`) get none.
//!
//! Tool failures are not protocol errors: they come back as a normal
//! `tools/call` result with `isError: true` and the structured error as the
//! text content.

use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::tools::Toolbox;

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "forge-relay";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

/// JSON-RPC front end for a [`Toolbox`].
pub struct Server {
    toolbox: Toolbox,
}

impl Server {
    pub fn new(toolbox: Toolbox) -> Self {
        Self { toolbox }
    }

    /// Serve on the process's stdin and stdout until stdin closes.
    pub async fn serve_stdio(&self) -> std::io::Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve line-delimited messages from `reader`, writing responses to
    /// `writer`, until `reader` reaches end of input.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!(
            server = SERVER_NAME,
            version = env!("CARGO_PKG_VERSION"),
            "serving on stdio"
        );
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(response) = self.handle_line(&line).await {
                let mut out = response.to_string();
                out.push('\n');
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        tracing::info!("input closed, shutting down");
        Ok(())
    }

    /// Handle one raw line. Returns the response, if any.
    pub async fn handle_line(&self, line: &str) -> Option<Value> {
        match serde_json::from_str::<Value>(line) {
            Ok(message) => self.handle_message(message).await,
            Err(e) => {
                tracing::debug!(error = %e, "unparseable message");
                Some(error_response(Value::Null, PARSE_ERROR, &format!("Parse error: {}", e)))
            }
        }
    }

    /// Handle one decoded message. Returns the response, if any.
    pub async fn handle_message(&self, message: Value) -> Option<Value> {
        let id = message.get("id").cloned();
        let method = message.get("method").and_then(Value::as_str);

        let (id, method) = match (id, method) {
            (None, Some(method)) => {
                tracing::debug!(method, "notification");
                return None;
            }
            (None, None) => return None,
            (Some(id), None) => {
                return Some(error_response(id, INVALID_REQUEST, "Invalid request: missing method"));
            }
            (Some(id), Some(method)) => (id, method),
        };

        let params = message.get("params").cloned().unwrap_or(Value::Null);
        let response = match method {
            "initialize" => success_response(id, self.initialize()),
            "ping" => success_response(id, json!({})),
            "tools/list" => success_response(id, json!({ "tools": self.toolbox.definitions() })),
            "tools/call" => self.tools_call(id, params).await,
            other => error_response(id, METHOD_NOT_FOUND, &format!("Method not found: {}", other)),
        };
        Some(response)
    }

    fn initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            }
        })
    }

    async fn tools_call(&self, id: Value, params: Value) -> Value {
        let Some(name) = params.get("name").and_then(Value::as_str) else {
            return error_response(id, INVALID_PARAMS, "Invalid params: missing tool name");
        };
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let (text, is_error) = match self.toolbox.call(name, arguments).await {
            Ok(output) => match serde_json::to_string_pretty(&output) {
                Ok(text) => (text, false),
                Err(e) => {
                    return error_response(id, INTERNAL_ERROR, &format!("Internal error: {}", e))
                }
            },
            Err(failure) => {
                tracing::warn!(
                    tool = name,
                    kind = failure.kind(),
                    error = %failure,
                    "tool call failed"
                );
                match serde_json::to_string_pretty(&failure.payload()) {
                    Ok(text) => (text, true),
                    Err(e) => {
                        return error_response(id, INTERNAL_ERROR, &format!("Internal error: {}", e))
                    }
                }
            }
        };

        success_response(
            id,
            json!({
                "content": [{ "type": "text", "text": text }],
                "isError": is_error,
            }),
        )
    }
}

fn success_response(id: Value, result: Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "result": result,
    })
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": { "code": code, "message": message },
    })
}
