//! Thin client for the Notion REST API.

use docbase_core::{DocbaseError, Result};
use serde_json::{json, Map, Value};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";

/// Pinned API version sent with every request.
pub const NOTION_API_VERSION: &str = "2022-06-28";

/// Authenticated Notion client covering the endpoints the documentation
/// tools need: search, page read/create/update, block-children append, and
/// database query. No retry or backoff; errors carry status and body.
#[derive(Debug, Clone)]
pub struct NotionClient {
    token: String,
    base_url: String,
    http: reqwest::Client,
}

impl NotionClient {
    /// Build a client against the production API.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    /// Build a client against a custom API root (proxies, tests).
    #[must_use]
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// `POST /search` filtered by object kind. Returns the result array.
    ///
    /// # Errors
    ///
    /// Returns [`DocbaseError::BackendStatus`] on non-success statuses and
    /// [`DocbaseError::Backend`] on transport failures.
    pub async fn search(&self, query: &str, filter_type: &str) -> Result<Vec<Value>> {
        let reply = self.post("/search", search_body(query, filter_type)).await?;
        Ok(results_array(reply))
    }

    /// `GET /pages/{id}`.
    ///
    /// # Errors
    ///
    /// See [`NotionClient::search`].
    pub async fn get_page(&self, page_id: &str) -> Result<Value> {
        self.get(&format!("/pages/{}", urlencoding::encode(page_id)))
            .await
    }

    /// `GET /blocks/{id}/children`. Returns the block array.
    ///
    /// # Errors
    ///
    /// See [`NotionClient::search`].
    pub async fn get_page_content(&self, page_id: &str) -> Result<Vec<Value>> {
        let reply = self
            .get(&format!(
                "/blocks/{}/children",
                urlencoding::encode(page_id)
            ))
            .await?;
        Ok(results_array(reply))
    }

    /// `POST /pages` under a parent page, with a title property and the
    /// given child blocks.
    ///
    /// # Errors
    ///
    /// See [`NotionClient::search`].
    pub async fn create_page(
        &self,
        parent_id: &str,
        title: &str,
        children: Vec<Value>,
    ) -> Result<Value> {
        self.post("/pages", page_body(parent_id, title, children))
            .await
    }

    /// `PATCH /pages/{id}` replacing the given properties.
    ///
    /// # Errors
    ///
    /// See [`NotionClient::search`].
    pub async fn update_page(&self, page_id: &str, properties: Value) -> Result<Value> {
        self.patch(
            &format!("/pages/{}", urlencoding::encode(page_id)),
            json!({ "properties": properties }),
        )
        .await
    }

    /// `PATCH /blocks/{id}/children` appending blocks to a page.
    ///
    /// # Errors
    ///
    /// See [`NotionClient::search`].
    pub async fn append_blocks(&self, page_id: &str, blocks: Vec<Value>) -> Result<Value> {
        self.patch(
            &format!("/blocks/{}/children", urlencoding::encode(page_id)),
            json!({ "children": blocks }),
        )
        .await
    }

    /// `POST /databases/{id}/query` with optional filters and sorts.
    /// Returns the result array.
    ///
    /// # Errors
    ///
    /// See [`NotionClient::search`].
    pub async fn query_database(
        &self,
        database_id: &str,
        filters: Option<Value>,
        sorts: Option<Value>,
    ) -> Result<Vec<Value>> {
        let reply = self
            .post(
                &format!(
                    "/databases/{}/query",
                    urlencoding::encode(database_id)
                ),
                query_body(filters, sorts),
            )
            .await?;
        Ok(results_array(reply))
    }

    async fn get(&self, path: &str) -> Result<Value> {
        self.execute(self.http.get(self.url(path))).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        self.execute(self.http.post(self.url(path)).json(&body)).await
    }

    async fn patch(&self, path: &str, body: Value) -> Result<Value> {
        self.execute(self.http.patch(self.url(path)).json(&body))
            .await
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = request
            .header("Notion-Version", NOTION_API_VERSION)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| DocbaseError::Backend(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DocbaseError::Backend(e.to_string()))?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Notion request failed");
            return Err(DocbaseError::BackendStatus {
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|e| DocbaseError::MalformedResponse(e.to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn search_body(query: &str, filter_type: &str) -> Value {
    json!({
        "query": query,
        "filter": { "value": filter_type, "property": "object" },
    })
}

fn page_body(parent_id: &str, title: &str, children: Vec<Value>) -> Value {
    json!({
        "parent": { "page_id": parent_id },
        "properties": {
            "title": { "title": [ { "text": { "content": title } } ] },
        },
        "children": children,
    })
}

fn query_body(filters: Option<Value>, sorts: Option<Value>) -> Value {
    let mut body = Map::new();
    if let Some(filters) = filters {
        body.insert("filter".to_string(), filters);
    }
    if let Some(sorts) = sorts {
        body.insert("sorts".to_string(), sorts);
    }
    Value::Object(body)
}

fn results_array(reply: Value) -> Vec<Value> {
    match reply {
        Value::Object(mut map) => match map.remove("results") {
            Some(Value::Array(results)) => results,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
