//! The local-variant MCP service: eight documentation tools over the JSON
//! store, with optional generative enrichment.

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
use serde_json::Value;

use docbase_core::{
    ContentError, Degraded, DocContent, DocType, Document, Result, CONTENT_KINDS,
};
use docbase_gemini::{
    parse::{parse_content_reply, parse_ranked_ids},
    prompt, GeminiClient, GenerativeBackend,
};
use docbase_store::{find_by_id, position_by_id, substring_search, DocStore};

use crate::session::Session;

/// The backend handle threaded through the session slot.
pub type Backend = Arc<dyn GenerativeBackend>;

/// Documentation server over a local JSON store.
#[derive(Clone)]
pub struct DocsService {
    store: DocStore,
    session: Arc<Session<Backend>>,
    tool_router: ToolRouter<Self>,
}

// === Tool request types ===

/// Request to configure the generative API key.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetupAuthRequest {
    /// Generative-language API key
    pub api_key: String,
}

/// Request for documentation search.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Search term; empty lists every document
    pub query: String,
    /// Document type filter (api_endpoint, feature, bug_report, general)
    pub filter_type: Option<String>,
}

/// Request to read one document.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetPageRequest {
    /// Document id
    pub page_id: String,
}

/// Request to create a document.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreatePageRequest {
    /// Parent document id (optional, never validated)
    pub parent_id: Option<String>,
    /// Document title
    pub title: String,
    /// Document type (api_endpoint, feature, bug_report, general)
    pub doc_type: String,
    /// Initial content fields for the document type
    pub content: Option<Value>,
}

/// Request to merge fields into a document's content.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdatePageRequest {
    /// Document id
    pub page_id: String,
    /// Content fields to merge
    pub updates: Value,
}

/// Request to append a section to a document's content log.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddContentRequest {
    /// Document id
    pub page_id: String,
    /// Section kind (paragraph, heading, code, list, quote, example)
    pub content_type: String,
    /// Text to append
    pub content: String,
}

/// Request for a corpus analysis.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AnalyzeRequest {
    /// Question to answer against the documentation
    pub query: String,
}

impl DocsService {
    pub fn new(store: DocStore, session: Arc<Session<Backend>>) -> Self {
        Self {
            store,
            session,
            tool_router: Self::tool_router(),
        }
    }

    async fn backend(&self) -> Option<Backend> {
        self.session.get().await
    }

    /// One backend call asking for relevant ids when substring search came
    /// up empty. Best effort: a failed call, an unparseable reply, or the
    /// `none` sentinel all degrade to an empty result.
    async fn ranked_fallback(&self, query: &str, docs: &[Document]) -> Degraded<Vec<Document>> {
        let Some(backend) = self.backend().await else {
            return Degraded::ok(Vec::new());
        };
        let reply = match backend.generate(&prompt::ranking_prompt(query, docs)).await {
            Ok(reply) => reply,
            Err(e) => {
                let reason = format!("ranking fallback call failed: {e}");
                tracing::warn!(%reason, "search degraded");
                return Degraded::degraded(Vec::new(), reason);
            }
        };
        match parse_ranked_ids(&reply) {
            Some(ids) => {
                // Reply order wins here; ids that match nothing are skipped.
                let hits: Vec<Document> = ids
                    .iter()
                    .filter_map(|id| find_by_id(docs, id).cloned())
                    .collect();
                if hits.len() < ids.len() {
                    tracing::warn!(
                        returned = ids.len(),
                        matched = hits.len(),
                        "ranking fallback returned unknown ids"
                    );
                }
                Degraded::ok(hits)
            }
            None => {
                let reason = "ranking fallback reported no relevant documents".to_string();
                tracing::warn!(%reason, "search degraded");
                Degraded::degraded(Vec::new(), reason)
            }
        }
    }

    async fn create_page(&self, req: CreatePageRequest) -> Result<Document> {
        let doc_type: DocType = req.doc_type.parse()?;
        let initial = req.content.unwrap_or_else(|| Value::Object(Default::default()));
        let content = DocContent::from_user_value(doc_type, &initial)?;
        let mut doc = Document::new(DocStore::generate_id(), req.title, content, req.parent_id);

        // Enrichment is attempted but never blocks creation.
        if let Some(backend) = self.backend().await {
            let prompt = prompt::create_prompt(doc_type, &doc.title, &doc.content);
            match backend.generate(&prompt).await {
                Ok(reply) => doc.content = parse_content_reply(&reply, doc_type).value,
                Err(e) => {
                    tracing::warn!(error = %e, "content enrichment failed; keeping the submitted content");
                }
            }
        }

        let mut docs = self.store.load().value;
        docs.push(doc.clone());
        self.store.save(&docs)?;
        Ok(doc)
    }

    async fn update_page(&self, req: &UpdatePageRequest) -> Result<Option<Document>> {
        let mut docs = self.store.load().value;
        let Some(index) = position_by_id(&docs, &req.page_id) else {
            return Ok(None);
        };
        let doc_type = docs[index].doc_type;
        let patch = DocContent::from_user_value(doc_type, &req.updates)?;
        let new_description = patch.description().map(str::to_string);
        docs[index].content.merge(patch)?;

        // Re-enrichment only when the update touched the description.
        if let Some(description) = new_description {
            if let Some(backend) = self.backend().await {
                let prompt =
                    prompt::update_description_prompt(&description, doc_type, &docs[index].content);
                match backend.generate(&prompt).await {
                    Ok(enhanced) => docs[index].content.set_description(enhanced),
                    Err(e) => {
                        tracing::warn!(error = %e, "description enrichment failed; keeping the submitted text");
                    }
                }
            }
        }

        docs[index].touch();
        self.store.save(&docs)?;
        Ok(Some(docs[index].clone()))
    }

    async fn append_content(&self, req: &AddContentRequest) -> Result<bool> {
        if !CONTENT_KINDS.contains(&req.content_type.as_str()) {
            return Err(ContentError::UnsupportedBlock(req.content_type.clone()).into());
        }
        let mut docs = self.store.load().value;
        let Some(index) = position_by_id(&docs, &req.page_id) else {
            return Ok(false);
        };
        docs[index]
            .content
            .append_section(&req.content_type, &req.content);
        docs[index].touch();
        self.store.save(&docs)?;
        Ok(true)
    }
}

fn pretty_content(content: &DocContent) -> String {
    serde_json::to_string_pretty(content).unwrap_or_else(|_| "{}".to_string())
}

fn format_search_results(hits: &[Document]) -> String {
    let entries: Vec<String> = hits
        .iter()
        .map(|doc| {
            format!(
                "**{}** ({})\n   {}\n   ID: {}\n   Updated: {}",
                doc.title,
                doc.doc_type,
                doc.content.description().unwrap_or("No description"),
                doc.id,
                doc.updated_at.to_rfc3339(),
            )
        })
        .collect();
    format!("Found {} documents:\n\n{}", hits.len(), entries.join("\n\n"))
}

fn counts_summary(docs: &[Document]) -> String {
    let count = |t: DocType| docs.iter().filter(|d| d.doc_type == t).count();
    format!(
        "Total documents: {}\n\
         - API endpoints: {}\n\
         - Features: {}\n\
         - Bug reports: {}\n\
         - General: {}",
        docs.len(),
        count(DocType::ApiEndpoint),
        count(DocType::Feature),
        count(DocType::BugReport),
        count(DocType::General),
    )
}

#[tool_router]
impl DocsService {
    /// Configure the generative API key at runtime.
    #[tool(
        description = "Configure the generative-language API key used for drafting and search assistance"
    )]
    async fn setup_auth(&self, Parameters(req): Parameters<SetupAuthRequest>) -> String {
        match GeminiClient::new(req.api_key) {
            Ok(client) => {
                self.session.configure(Arc::new(client)).await;
                "API key configured. Generative assistance is now enabled.".to_string()
            }
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Substring search with a generative ranking fallback.
    #[tool(
        description = "Search documentation by text, with a generative ranking fallback when nothing matches"
    )]
    async fn search_documentation(&self, Parameters(req): Parameters<SearchRequest>) -> String {
        let filter = match req.filter_type.as_deref().map(str::parse::<DocType>) {
            Some(Err(e)) => return format!("Error: {e}"),
            Some(Ok(filter)) => Some(filter),
            None => None,
        };
        let docs = self.store.load().value;
        let hits: Vec<Document> = substring_search(&docs, &req.query, filter)
            .into_iter()
            .cloned()
            .collect();
        let hits = if hits.is_empty() && !req.query.is_empty() && !docs.is_empty() {
            self.ranked_fallback(&req.query, &docs).await.value
        } else {
            hits
        };
        format_search_results(&hits)
    }

    /// Read one document in full.
    #[tool(description = "Get the full details of a document by id")]
    async fn get_page_details(&self, Parameters(req): Parameters<GetPageRequest>) -> String {
        let docs = self.store.load().value;
        match find_by_id(&docs, &req.page_id) {
            Some(doc) => format!(
                "Document details\n\n\
                 Title: {}\nType: {}\nID: {}\nCreated: {}\nUpdated: {}\n\n\
                 Content:\n{}",
                doc.title,
                doc.doc_type,
                doc.id,
                doc.created_at.to_rfc3339(),
                doc.updated_at.to_rfc3339(),
                pretty_content(&doc.content),
            ),
            None => "Document not found".to_string(),
        }
    }

    /// Create a document, drafting content with the backend when configured.
    #[tool(description = "Create a new documentation page, drafted by the generative backend when configured")]
    async fn create_documentation_page(
        &self,
        Parameters(req): Parameters<CreatePageRequest>,
    ) -> String {
        match self.create_page(req).await {
            Ok(doc) => format!(
                "Document created\n\n\
                 Title: {}\nType: {}\nID: {}\n\n\
                 Generated content:\n{}",
                doc.title,
                doc.doc_type,
                doc.id,
                pretty_content(&doc.content),
            ),
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Merge content fields into an existing document.
    #[tool(description = "Update an existing document by merging content fields")]
    async fn update_documentation(&self, Parameters(req): Parameters<UpdatePageRequest>) -> String {
        match self.update_page(&req).await {
            Ok(Some(doc)) => format!(
                "Document updated\n\n\
                 Title: {}\nID: {}\nUpdated: {}\n\n\
                 New content:\n{}",
                doc.title,
                doc.id,
                doc.updated_at.to_rfc3339(),
                pretty_content(&doc.content),
            ),
            Ok(None) => format!("Document {} not found", req.page_id),
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Append a section to a document's content log.
    #[tool(description = "Append a content section to an existing document")]
    async fn add_content_to_page(&self, Parameters(req): Parameters<AddContentRequest>) -> String {
        match self.append_content(&req).await {
            Ok(true) => format!("Content added to document {}", req.page_id),
            Ok(false) => format!("Document {} not found", req.page_id),
            Err(e) => format!("Error: {e}"),
        }
    }

    /// Summarize the whole corpus.
    #[tool(description = "Generate an executive summary of all documentation")]
    async fn generate_documentation_summary(&self) -> String {
        let docs = self.store.load().value;
        let body = match self.backend().await {
            None => counts_summary(&docs),
            Some(backend) => match backend.generate(&prompt::summary_prompt(&docs)).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(error = %e, "summary generation failed");
                    "Failed to generate a summary with the generative backend".to_string()
                }
            },
        };
        format!("Documentation summary\n\n{body}")
    }

    /// Answer a query against the corpus. Needs a configured backend.
    #[tool(description = "Analyze the documentation corpus against a specific query")]
    async fn analyze_documentation(&self, Parameters(req): Parameters<AnalyzeRequest>) -> String {
        let Some(backend) = self.backend().await else {
            return "Analysis is not available without a configured API key".to_string();
        };
        let docs = self.store.load().value;
        let body = match backend.generate(&prompt::analysis_prompt(&req.query, &docs)).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "analysis failed");
                "Failed to analyze the documentation with the generative backend".to_string()
            }
        };
        format!("Documentation analysis\n\n{body}")
    }
}

impl ServerHandler for DocsService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Documentation server over a local JSON store. Search, read, create, \
                 update, and extend documentation pages; summaries, analysis, and \
                 content drafting use the generative backend once an API key is \
                 configured with setup_auth."
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
        // Unknown tool names are a normal reply, not a protocol error.
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
    use async_trait::async_trait;
    use docbase_core::DocbaseError;
    use serde_json::json;
    use tempfile::TempDir;

    struct CannedBackend(String);

    #[async_trait]
    impl GenerativeBackend for CannedBackend {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl GenerativeBackend for FailingBackend {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(DocbaseError::Backend("connection refused".to_string()))
        }
    }

    fn service(dir: &TempDir, backend: Option<Backend>) -> DocsService {
        let store = DocStore::open(dir.path().join("documentation.json")).unwrap();
        DocsService::new(store, Arc::new(Session::new(backend)))
    }

    fn canned(reply: &str) -> Option<Backend> {
        Some(Arc::new(CannedBackend(reply.to_string())))
    }

    async fn create_bug(service: &DocsService) -> Document {
        let reply = service
            .create_documentation_page(Parameters(CreatePageRequest {
                parent_id: None,
                title: "Crash on save".to_string(),
                doc_type: "bug_report".to_string(),
                content: Some(json!({ "severity": "High", "description": "NPE on save" })),
            }))
            .await;
        assert!(reply.starts_with("Document created"), "{reply}");
        service.store.load().value.pop().unwrap()
    }

    // === Create ===

    #[tokio::test]
    async fn create_without_backend_persists_the_given_content() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        let doc = create_bug(&service).await;

        assert_eq!(doc.doc_type, DocType::BugReport);
        assert_eq!(doc.created_at, doc.updated_at);
        assert_eq!(doc.content.description(), Some("NPE on save"));
        assert!(!doc.id.is_empty());

        let docs = service.store.load().value;
        assert_eq!(find_by_id(&docs, &doc.id), Some(&doc));
    }

    #[tokio::test]
    async fn create_rejects_field_drift() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        let reply = service
            .create_documentation_page(Parameters(CreatePageRequest {
                parent_id: None,
                title: "Checkout".to_string(),
                doc_type: "feature".to_string(),
                content: Some(json!({ "severity": "High" })),
            }))
            .await;
        assert!(reply.starts_with("Error: unknown field 'severity'"), "{reply}");
        assert!(service.store.load().value.is_empty());
    }

    #[tokio::test]
    async fn create_with_malformed_reply_still_persists() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, canned("totally not json"));
        let doc = create_bug(&service).await;

        // Enrichment degraded to plain text; creation still went through.
        assert_eq!(doc.content.description(), Some("totally not json"));
        assert_eq!(doc.content.raw_content(), Some("totally not json"));
    }

    #[tokio::test]
    async fn create_with_json_reply_uses_the_parsed_fields() {
        let dir = TempDir::new().unwrap();
        let service = service(
            &dir,
            canned(r#"{"severity": "Critical", "steps": "1. open\n2. save"}"#),
        );
        let doc = create_bug(&service).await;

        match doc.content {
            DocContent::BugReport(c) => {
                assert_eq!(c.severity.as_deref(), Some("Critical"));
                assert_eq!(c.steps.as_deref(), Some("1. open\n2. save"));
                assert!(c.raw_content.is_some());
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_with_failing_backend_keeps_the_submitted_content() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, Some(Arc::new(FailingBackend)));
        let doc = create_bug(&service).await;
        assert_eq!(doc.content.description(), Some("NPE on save"));
    }

    // === Get ===

    #[tokio::test]
    async fn get_renders_details_or_not_found() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        let doc = create_bug(&service).await;

        let reply = service
            .get_page_details(Parameters(GetPageRequest { page_id: doc.id }))
            .await;
        assert!(reply.contains("Title: Crash on save"), "{reply}");
        assert!(reply.contains("Type: bug_report"), "{reply}");

        let reply = service
            .get_page_details(Parameters(GetPageRequest {
                page_id: "missing".to_string(),
            }))
            .await;
        assert_eq!(reply, "Document not found");
    }

    // === Update ===

    #[tokio::test]
    async fn update_merges_fields_and_bumps_the_timestamp() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        service
            .create_documentation_page(Parameters(CreatePageRequest {
                parent_id: None,
                title: "Checkout".to_string(),
                doc_type: "feature".to_string(),
                content: Some(json!({ "description": "a", "name": "b" })),
            }))
            .await;
        let doc = service.store.load().value.pop().unwrap();

        let reply = service
            .update_documentation(Parameters(UpdatePageRequest {
                page_id: doc.id.clone(),
                updates: json!({ "description": "x" }),
            }))
            .await;
        assert!(reply.starts_with("Document updated"), "{reply}");

        let updated = service.store.load().value.pop().unwrap();
        assert_eq!(updated.content.description(), Some("x"));
        assert_eq!(updated.content.name(), Some("b"));
        assert!(updated.updated_at >= updated.created_at);
        assert!(updated.updated_at > doc.updated_at);
    }

    #[tokio::test]
    async fn update_of_an_unknown_id_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        let reply = service
            .update_documentation(Parameters(UpdatePageRequest {
                page_id: "ghost".to_string(),
                updates: json!({ "description": "x" }),
            }))
            .await;
        assert_eq!(reply, "Document ghost not found");
    }

    #[tokio::test]
    async fn update_with_backend_enriches_the_description() {
        let dir = TempDir::new().unwrap();
        let plain = service(&dir, None);
        let doc = create_bug(&plain).await;

        let enriched = service(&dir, canned("a much better description"));
        let reply = enriched
            .update_documentation(Parameters(UpdatePageRequest {
                page_id: doc.id,
                updates: json!({ "description": "short" }),
            }))
            .await;
        assert!(reply.starts_with("Document updated"), "{reply}");
        let updated = enriched.store.load().value.pop().unwrap();
        assert_eq!(updated.content.description(), Some("a much better description"));
    }

    // === Add content ===

    #[tokio::test]
    async fn added_sections_accumulate_in_order() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        let doc = create_bug(&service).await;

        for body in ["A", "B"] {
            let reply = service
                .add_content_to_page(Parameters(AddContentRequest {
                    page_id: doc.id.clone(),
                    content_type: "paragraph".to_string(),
                    content: body.to_string(),
                }))
                .await;
            assert_eq!(reply, format!("Content added to document {}", doc.id));
        }

        let updated = service.store.load().value.pop().unwrap();
        let log = updated.content.raw_content().unwrap();
        let a = log.find("\nA").unwrap();
        let b = log.find("\nB").unwrap();
        assert!(a < b, "sections out of order: {log}");
    }

    #[tokio::test]
    async fn add_content_rejects_unknown_kinds() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        let reply = service
            .add_content_to_page(Parameters(AddContentRequest {
                page_id: "any".to_string(),
                content_type: "video".to_string(),
                content: "clip".to_string(),
            }))
            .await;
        assert_eq!(reply, "Error: unsupported content type: video");
    }

    #[tokio::test]
    async fn add_content_to_an_unknown_id_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        let reply = service
            .add_content_to_page(Parameters(AddContentRequest {
                page_id: "ghost".to_string(),
                content_type: "example".to_string(),
                content: "text".to_string(),
            }))
            .await;
        assert_eq!(reply, "Document ghost not found");
    }

    // === Search ===

    async fn seed_corpus(service: &DocsService) -> Vec<Document> {
        for (title, doc_type, content) in [
            ("Payments API", "api_endpoint", json!({ "description": "Card charges" })),
            ("Checkout revamp", "feature", json!({ "name": "express checkout" })),
        ] {
            service
                .create_documentation_page(Parameters(CreatePageRequest {
                    parent_id: None,
                    title: title.to_string(),
                    doc_type: doc_type.to_string(),
                    content: Some(content),
                }))
                .await;
        }
        service.store.load().value
    }

    #[tokio::test]
    async fn empty_query_lists_everything_in_store_order() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        seed_corpus(&service).await;

        let reply = service
            .search_documentation(Parameters(SearchRequest {
                query: String::new(),
                filter_type: None,
            }))
            .await;
        assert!(reply.starts_with("Found 2 documents:"), "{reply}");
        let payments = reply.find("Payments API").unwrap();
        let checkout = reply.find("Checkout revamp").unwrap();
        assert!(payments < checkout);
    }

    #[tokio::test]
    async fn type_filter_narrows_the_listing() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        seed_corpus(&service).await;

        let reply = service
            .search_documentation(Parameters(SearchRequest {
                query: String::new(),
                filter_type: Some("feature".to_string()),
            }))
            .await;
        assert!(reply.starts_with("Found 1 documents:"), "{reply}");
        assert!(reply.contains("Checkout revamp"));
    }

    #[tokio::test]
    async fn unknown_filter_types_are_an_error() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        let reply = service
            .search_documentation(Parameters(SearchRequest {
                query: "x".to_string(),
                filter_type: Some("blog_post".to_string()),
            }))
            .await;
        assert_eq!(reply, "Error: unknown document type: blog_post");
    }

    #[tokio::test]
    async fn no_match_without_backend_is_empty() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        seed_corpus(&service).await;

        let reply = service
            .search_documentation(Parameters(SearchRequest {
                query: "quantum".to_string(),
                filter_type: None,
            }))
            .await;
        assert!(reply.starts_with("Found 0 documents:"), "{reply}");
    }

    #[tokio::test]
    async fn ranking_fallback_returns_documents_in_reply_order() {
        let dir = TempDir::new().unwrap();
        let seeded = service(&dir, None);
        let docs = seed_corpus(&seeded).await;

        // Second doc first, plus one hallucinated id that must be skipped.
        let reply_ids = format!("{}, ghost-id, {}", docs[1].id, docs[0].id);
        let ranked = service(&dir, canned(&reply_ids));
        let reply = ranked
            .search_documentation(Parameters(SearchRequest {
                query: "quantum".to_string(),
                filter_type: None,
            }))
            .await;
        assert!(reply.starts_with("Found 2 documents:"), "{reply}");
        let checkout = reply.find("Checkout revamp").unwrap();
        let payments = reply.find("Payments API").unwrap();
        assert!(checkout < payments, "fallback ignored reply order: {reply}");
    }

    #[tokio::test]
    async fn ranking_fallback_honors_the_none_sentinel() {
        let dir = TempDir::new().unwrap();
        let seeded = service(&dir, None);
        seed_corpus(&seeded).await;

        let ranked = service(&dir, canned("none"));
        let reply = ranked
            .search_documentation(Parameters(SearchRequest {
                query: "quantum".to_string(),
                filter_type: None,
            }))
            .await;
        assert!(reply.starts_with("Found 0 documents:"), "{reply}");
    }

    #[tokio::test]
    async fn ranking_fallback_swallows_backend_failures() {
        let dir = TempDir::new().unwrap();
        let seeded = service(&dir, None);
        seed_corpus(&seeded).await;

        let ranked = service(&dir, Some(Arc::new(FailingBackend)));
        let reply = ranked
            .search_documentation(Parameters(SearchRequest {
                query: "quantum".to_string(),
                filter_type: None,
            }))
            .await;
        assert!(reply.starts_with("Found 0 documents:"), "{reply}");
    }

    // === Summary and analysis ===

    #[tokio::test]
    async fn summary_without_backend_counts_per_type() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        seed_corpus(&service).await;

        let reply = service.generate_documentation_summary().await;
        assert!(reply.starts_with("Documentation summary"), "{reply}");
        assert!(reply.contains("Total documents: 2"));
        assert!(reply.contains("- API endpoints: 1"));
        assert!(reply.contains("- Features: 1"));
        assert!(reply.contains("- Bug reports: 0"));
    }

    #[tokio::test]
    async fn summary_with_backend_uses_its_text() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, canned("Everything is on track."));
        let reply = service.generate_documentation_summary().await;
        assert_eq!(reply, "Documentation summary\n\nEverything is on track.");
    }

    #[tokio::test]
    async fn summary_with_failing_backend_degrades_to_a_fixed_sentence() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, Some(Arc::new(FailingBackend)));
        let reply = service.generate_documentation_summary().await;
        assert!(
            reply.contains("Failed to generate a summary"),
            "{reply}"
        );
    }

    #[tokio::test]
    async fn analysis_requires_a_backend() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        let reply = service
            .analyze_documentation(Parameters(AnalyzeRequest {
                query: "what is missing?".to_string(),
            }))
            .await;
        assert_eq!(reply, "Analysis is not available without a configured API key");
    }

    #[tokio::test]
    async fn analysis_with_backend_renders_its_text() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, canned("The payment docs lack examples."));
        let reply = service
            .analyze_documentation(Parameters(AnalyzeRequest {
                query: "what is missing?".to_string(),
            }))
            .await;
        assert_eq!(
            reply,
            "Documentation analysis\n\nThe payment docs lack examples."
        );
    }

    // === Dispatch ===

    #[tokio::test]
    async fn the_router_serves_exactly_the_eight_tools() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, None);
        for name in [
            "setup_auth",
            "search_documentation",
            "get_page_details",
            "create_documentation_page",
            "update_documentation",
            "add_content_to_page",
            "generate_documentation_summary",
            "analyze_documentation",
        ] {
            assert!(service.tool_router.has_route(name), "missing tool {name}");
        }
        assert_eq!(service.tool_router.list_all().len(), 8);
        assert!(!service.tool_router.has_route("frobnicate"));
    }
}
