//! MCP (Model Context Protocol) server for webvisit.
//!
//! Lets agent hosts call the visit pipeline as a tool.
//! Implements JSON-RPC 2.0 over stdio.

mod protocol;
mod server;
mod tools;

pub use server::McpServer;
pub use tools::VISIT_TOOL;
