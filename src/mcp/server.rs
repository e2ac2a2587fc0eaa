//! MCP server implementation.

use super::protocol::*;
use super::tools::{get_tools, VISIT_TOOL};
use crate::config::Settings;
use crate::visit::{VisitRequest, Visitor};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "webvisit";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP server exposing the `visit` tool.
pub struct McpServer {
    settings: Settings,
    visitor: Option<Arc<Visitor>>,
}

impl McpServer {
    /// Create a server; the visitor is built on `initialize`.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            visitor: None,
        }
    }

    /// Create a server around an existing visitor.
    pub fn with_visitor(settings: Settings, visitor: Arc<Visitor>) -> Self {
        Self {
            settings,
            visitor: Some(visitor),
        }
    }

    /// Serve requests from stdin until it closes. Responses go to stdout,
    /// logs to stderr and the log file.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        info!("webvisit MCP server starting");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
            .await
    }

    /// Serve newline-delimited JSON-RPC from `reader` to `writer`.
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(response) = self.handle_line(line).await {
                let mut out = serde_json::to_string(&response)?;
                out.push('\n');
                writer.write_all(out.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("stdin closed, MCP server stopping");
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::error(None, ErrorCode::ParseError, "Parse error"));
            }
        };

        if request.is_notification() {
            debug!("Notification: {}", request.method);
            return None;
        }

        Some(self.handle_request(request).await)
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!("Request: {}", request.method);
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id),
            "ping" => JsonRpcResponse::success(request.id, json!({})),
            "tools/list" => to_response(request.id, ToolsListResult { tools: get_tools() }),
            "tools/call" => self.handle_tools_call(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                ErrorCode::MethodNotFound,
                format!("Method not found: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&mut self, id: Option<Value>) -> JsonRpcResponse {
        if let Err(e) = self.ensure_visitor() {
            error!("Failed to initialize visitor: {}", e);
            return JsonRpcResponse::error(
                id,
                ErrorCode::ServerError,
                format!("Init failed: {}", e),
            );
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION,
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME,
                version: SERVER_VERSION,
            },
        };

        to_response(id, result)
    }

    fn ensure_visitor(&mut self) -> crate::error::Result<Arc<Visitor>> {
        if let Some(visitor) = &self.visitor {
            return Ok(visitor.clone());
        }
        let visitor = Arc::new(Visitor::new(&self.settings)?);
        info!("Visitor initialized");
        self.visitor = Some(visitor.clone());
        Ok(visitor)
    }

    async fn handle_tools_call(
        &mut self,
        id: Option<Value>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params = match params.map(serde_json::from_value::<ToolCallParams>) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    ErrorCode::InvalidParams,
                    format!("Invalid params: {}", e),
                )
            }
            None => return JsonRpcResponse::error(id, ErrorCode::InvalidParams, "Missing params"),
        };

        let result = match params.name.as_str() {
            VISIT_TOOL => self.tool_visit(params.arguments).await,
            _ => ToolCallResult::error(format!("Unknown tool: {}", params.name)),
        };

        to_response(id, result)
    }

    async fn tool_visit(&mut self, args: Option<Value>) -> ToolCallResult {
        let request = match VisitRequest::from_value(&args.unwrap_or(Value::Null)) {
            Ok(request) => request,
            Err(e) => return ToolCallResult::error(e.to_string()),
        };

        match self.ensure_visitor() {
            Ok(visitor) => ToolCallResult::text(visitor.visit(&request).await),
            Err(e) => ToolCallResult::error(format!("Visit tool unavailable: {}", e)),
        }
    }
}

fn to_response<T: Serialize>(id: Option<Value>, result: T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, ErrorCode::InternalError, e.to_string()),
    }
}
