//! The Notion-variant MCP service: seven tools proxying the Notion REST
//! API. Holds no local state; every call goes straight to the wire.

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::ToolCallContext, wrapper::Parameters},
    model::{
        CallToolRequestParam, CallToolResult, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router, ErrorData as McpError, ServerHandler,
};
use serde::Deserialize;
use serde_json::{json, Value};

use docbase_core::{DocContent, DocType, DocbaseError, Result};
use docbase_notion::{content_block, documentation_blocks, NotionClient};

use crate::session::Session;

/// Documentation server proxying a Notion workspace.
#[derive(Clone)]
pub struct NotionService {
    session: Arc<Session<NotionClient>>,
    tool_router: ToolRouter<Self>,
}

// === Tool request types ===

/// Request to configure the Notion integration token.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NotionAuthRequest {
    /// Notion integration token
    pub token: String,
}

/// Request for a workspace search.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NotionSearchRequest {
    /// Search term passed to the Notion search endpoint
    pub query: String,
    /// Object kind to search for ("page" or "database"); defaults to "page"
    pub filter_type: Option<String>,
}

/// Request to read one page.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NotionPageRequest {
    /// Notion page id
    pub page_id: String,
}

/// Request to create a documentation page.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NotionCreateRequest {
    /// Parent page id the new page is filed under
    pub parent_id: String,
    /// Page title
    pub title: String,
    /// Document type (api_endpoint, feature, bug_report, general)
    pub doc_type: String,
    /// Content fields rendered into the page body
    pub content: Option<Value>,
}

/// Request to update page properties.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NotionUpdateRequest {
    /// Notion page id
    pub page_id: String,
    /// Notion properties object to apply
    pub properties: Value,
}

/// Request to query a documentation database.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueryDatabaseRequest {
    /// Notion database id
    pub database_id: String,
    /// Notion filter object, passed through verbatim
    pub filters: Option<Value>,
    /// Notion sorts array, passed through verbatim
    pub sorts: Option<Value>,
}

/// Request to append one block to a page.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct NotionAddContentRequest {
    /// Notion page id
    pub page_id: String,
    /// Block kind (paragraph, heading, code, quote, list)
    pub content_type: String,
    /// Block text
    pub content: String,
    /// Language tag for code blocks; defaults to "text"
    pub language: Option<String>,
}

impl NotionService {
    #[must_use]
    pub fn new(session: Arc<Session<NotionClient>>) -> Self {
        Self {
            session,
            tool_router: Self::tool_router(),
        }
    }

    async fn client(&self) -> Result<NotionClient> {
        self.session.get().await.ok_or_else(|| {
            DocbaseError::MissingCredential(
                "Notion token not configured; call setup_auth first".to_string(),
            )
        })
    }
}

/// Pull the page title out of Notion's nested property layout.
fn page_title(page: &Value) -> &str {
    page.pointer("/properties/title/title/0/text/content")
        .and_then(Value::as_str)
        .unwrap_or("Untitled")
}

fn page_summary(page: &Value) -> Value {
    json!({
        "id": page.get("id").cloned().unwrap_or(Value::Null),
        "title": page_title(page),
        "url": page.get("url").cloned().unwrap_or(Value::Null),
        "last_edited": page.get("last_edited_time").cloned().unwrap_or(Value::Null),
    })
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string())
}

fn field(page: &Value, key: &str) -> String {
    page.get(key)
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

#[tool_router]
impl NotionService {
    /// Configure the Notion token at runtime.
    #[tool(description = "Configure the Notion integration token used by every other tool")]
    async fn setup_auth(&self, Parameters(req): Parameters<NotionAuthRequest>) -> String {
        self.session.configure(NotionClient::new(req.token)).await;
        "Authentication configured successfully".to_string()
    }

    /// Search the workspace for pages or databases.
    #[tool(description = "Search Notion for documentation pages or databases")]
    async fn search_documentation(
        &self,
        Parameters(req): Parameters<NotionSearchRequest>,
    ) -> String {
        let run = async {
            let client = self.client().await?;
            let filter = req.filter_type.as_deref().unwrap_or("page");
            client.search(&req.query, filter).await
        };
        match run.await {
            Ok(results) => {
                let summaries: Vec<Value> = results.iter().take(10).map(page_summary).collect();
                format!(
                    "Found {} pages:\n\n{}",
                    results.len(),
                    pretty(&Value::Array(summaries)),
                )
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Read one page's metadata and block children.
    #[tool(description = "Get a Notion page's metadata and content blocks")]
    async fn get_page_details(&self, Parameters(req): Parameters<NotionPageRequest>) -> String {
        let run = async {
            let client = self.client().await?;
            let page = client.get_page(&req.page_id).await?;
            let blocks = client.get_page_content(&req.page_id).await?;
            Ok::<_, DocbaseError>((page, blocks))
        };
        match run.await {
            Ok((page, blocks)) => format!(
                "Page information:\n\n\
                 ID: {}\nURL: {}\nLast edited: {}\n\n\
                 Content ({} blocks):\n{}",
                field(&page, "id"),
                field(&page, "url"),
                field(&page, "last_edited_time"),
                blocks.len(),
                pretty(&Value::Array(blocks)),
            ),
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Create a page with a type-specific block scaffold.
    #[tool(description = "Create a documentation page under a parent, laid out by document type")]
    async fn create_documentation_page(
        &self,
        Parameters(req): Parameters<NotionCreateRequest>,
    ) -> String {
        let run = async {
            let doc_type: DocType = req.doc_type.parse()?;
            let initial = req
                .content
                .unwrap_or_else(|| Value::Object(Default::default()));
            let content = DocContent::from_user_value(doc_type, &initial)?;
            let client = self.client().await?;
            let page = client
                .create_page(&req.parent_id, &req.title, documentation_blocks(&content))
                .await?;
            Ok::<_, DocbaseError>((doc_type, page))
        };
        match run.await {
            Ok((doc_type, page)) => format!(
                "Documentation page created:\n\nID: {}\nURL: {}\nType: {}",
                field(&page, "id"),
                field(&page, "url"),
                doc_type,
            ),
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Patch a page's properties.
    #[tool(description = "Update a Notion page's properties")]
    async fn update_documentation(
        &self,
        Parameters(req): Parameters<NotionUpdateRequest>,
    ) -> String {
        let run = async {
            let client = self.client().await?;
            client.update_page(&req.page_id, req.properties).await
        };
        match run.await {
            Ok(page) => format!(
                "Page updated:\n\nID: {}\nLast edited: {}",
                field(&page, "id"),
                field(&page, "last_edited_time"),
            ),
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Query a database with pass-through filters and sorts.
    #[tool(description = "Query a Notion documentation database with optional filters and sorts")]
    async fn query_documentation_database(
        &self,
        Parameters(req): Parameters<QueryDatabaseRequest>,
    ) -> String {
        let run = async {
            let client = self.client().await?;
            client
                .query_database(&req.database_id, req.filters, req.sorts)
                .await
        };
        match run.await {
            Ok(items) => format!(
                "Query results ({} items):\n\n{}",
                items.len(),
                pretty(&Value::Array(items)),
            ),
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Append one block to a page.
    #[tool(description = "Append a content block to an existing Notion page")]
    async fn add_content_to_page(
        &self,
        Parameters(req): Parameters<NotionAddContentRequest>,
    ) -> String {
        // Block kind is validated before touching the wire.
        let block = match content_block(&req.content_type, &req.content, req.language.as_deref()) {
            Ok(block) => block,
            Err(e) => return format!("Error: {e}"),
        };
        let run = async {
            let client = self.client().await?;
            client.append_blocks(&req.page_id, vec![block]).await
        };
        match run.await {
            Ok(_) => format!("Content added to page {}", req.page_id),
            Err(e) => format!("Error: {e}"),
        }
    }
}

impl ServerHandler for NotionService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Documentation server proxying the Notion REST API. Configure an \
                 integration token with setup_auth, then search, read, create, \
                 update, and extend documentation pages and query documentation \
                 databases."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> std::result::Result<CallToolResult, McpError> {
        if !self.tool_router.has_route(request.name.as_ref()) {
            return Ok(crate::unknown_tool_result(&request.name));
        }
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> std::result::Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            meta: Default::default(),
            next_cursor: None,
            tools: self.tool_router.list_all(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unconfigured() -> NotionService {
        NotionService::new(Arc::new(Session::new(None)))
    }

    #[tokio::test]
    async fn tools_refuse_to_run_without_a_token() {
        let service = unconfigured();
        let reply = service
            .search_documentation(Parameters(NotionSearchRequest {
                query: "payments".to_string(),
                filter_type: None,
            }))
            .await;
        assert_eq!(
            reply,
            "Error: missing credential: Notion token not configured; call setup_auth first"
        );

        let reply = service
            .update_documentation(Parameters(NotionUpdateRequest {
                page_id: "abc".to_string(),
                properties: json!({}),
            }))
            .await;
        assert!(reply.starts_with("Error: missing credential"), "{reply}");
    }

    #[tokio::test]
    async fn setup_auth_installs_a_client() {
        let service = unconfigured();
        let reply = service
            .setup_auth(Parameters(NotionAuthRequest {
                token: "secret_abc".to_string(),
            }))
            .await;
        assert_eq!(reply, "Authentication configured successfully");
        assert!(service.client().await.is_ok());
    }

    #[tokio::test]
    async fn create_validates_input_before_the_wire() {
        // No token configured, so reaching the wire would fail differently;
        // bad input must be reported first.
        let service = unconfigured();
        let reply = service
            .create_documentation_page(Parameters(NotionCreateRequest {
                parent_id: "parent".to_string(),
                title: "Checkout".to_string(),
                doc_type: "blog_post".to_string(),
                content: None,
            }))
            .await;
        assert_eq!(reply, "Error: unknown document type: blog_post");

        let reply = service
            .create_documentation_page(Parameters(NotionCreateRequest {
                parent_id: "parent".to_string(),
                title: "Checkout".to_string(),
                doc_type: "feature".to_string(),
                content: Some(json!({ "severity": "High" })),
            }))
            .await;
        assert!(reply.starts_with("Error: unknown field 'severity'"), "{reply}");
    }

    #[tokio::test]
    async fn add_content_rejects_unknown_block_kinds_offline() {
        let service = unconfigured();
        let reply = service
            .add_content_to_page(Parameters(NotionAddContentRequest {
                page_id: "abc".to_string(),
                content_type: "video".to_string(),
                content: "clip".to_string(),
                language: None,
            }))
            .await;
        assert_eq!(reply, "Error: unsupported content type: video");
    }

    #[test]
    fn page_titles_come_from_the_nested_property_layout() {
        let page = json!({
            "id": "p1",
            "properties": {
                "title": { "title": [ { "text": { "content": "Payments API" } } ] }
            }
        });
        assert_eq!(page_title(&page), "Payments API");
        assert_eq!(page_title(&json!({ "id": "p2" })), "Untitled");
    }

    #[test]
    fn page_summaries_keep_the_four_fields() {
        let page = json!({
            "id": "p1",
            "url": "https://notion.so/p1",
            "last_edited_time": "2026-08-25T10:00:00.000Z",
            "properties": {
                "title": { "title": [ { "text": { "content": "Payments API" } } ] }
            }
        });
        assert_eq!(
            page_summary(&page),
            json!({
                "id": "p1",
                "title": "Payments API",
                "url": "https://notion.so/p1",
                "last_edited": "2026-08-25T10:00:00.000Z",
            })
        );
    }

    #[tokio::test]
    async fn the_router_serves_exactly_the_seven_tools() {
        let service = unconfigured();
        for name in [
            "setup_auth",
            "search_documentation",
            "get_page_details",
            "create_documentation_page",
            "update_documentation",
            "query_documentation_database",
            "add_content_to_page",
        ] {
            assert!(service.tool_router.has_route(name), "missing tool {name}");
        }
        assert_eq!(service.tool_router.list_all().len(), 7);
        assert!(!service.tool_router.has_route("frobnicate"));
    }
}
