//! # docbase-mcp
//!
//! The MCP-facing services. Two variants share one dispatch discipline:
//!
//! - [`DocsService`] — eight tools over the local JSON store, with optional
//!   generative enrichment.
//! - [`NotionService`] — seven tools proxying the Notion REST API, no local
//!   state.
//!
//! Every tool call returns a single text block. Operation errors are
//! rendered as `Error: ...` text, unknown tool names as `Unknown tool:
//! ...`; nothing propagates to the transport.

use rmcp::model::{CallToolResult, Content};

pub mod local;
pub mod notion;
pub mod session;

pub use local::{Backend, DocsService};
pub use notion::NotionService;
pub use session::Session;

/// Text rendered for a tool name outside the catalog. Kept a normal reply
/// so the MCP channel stays open.
#[must_use]
pub fn unknown_tool_reply(name: &str) -> String {
    format!("Unknown tool: {name}")
}

/// The complete result both services return from `call_tool` for a tool
/// name outside the catalog: one text block, not an error.
#[must_use]
pub fn unknown_tool_result(name: &str) -> CallToolResult {
    CallToolResult::success(vec![Content::text(unknown_tool_reply(name))])
}
