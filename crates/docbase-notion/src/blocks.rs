//! Notion block payloads for documentation content.

use docbase_core::{ContentError, DocContent};
use serde_json::{json, Value};

fn rich_text(text: &str) -> Value {
    json!([{ "type": "text", "text": { "content": text } }])
}

fn heading_2(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "heading_2",
        "heading_2": { "rich_text": rich_text(text) },
    })
}

fn paragraph(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "paragraph",
        "paragraph": { "rich_text": rich_text(text) },
    })
}

fn code(text: &str, language: &str) -> Value {
    json!({
        "object": "block",
        "type": "code",
        "code": { "rich_text": rich_text(text), "language": language },
    })
}

fn quote(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "quote",
        "quote": { "rich_text": rich_text(text) },
    })
}

fn bulleted_list_item(text: &str) -> Value {
    json!({
        "object": "block",
        "type": "bulleted_list_item",
        "bulleted_list_item": { "rich_text": rich_text(text) },
    })
}

/// Render typed content as the initial block layout of a new page.
///
/// Missing fields fall back to the template defaults the page layout
/// expects (method `GET`, status `In development`, severity `Medium`).
#[must_use]
pub fn documentation_blocks(content: &DocContent) -> Vec<Value> {
    match content {
        DocContent::ApiEndpoint(c) => vec![
            heading_2(&format!(
                "API Endpoint: {}",
                c.endpoint.as_deref().unwrap_or("")
            )),
            paragraph(&format!("Method: {}", c.method.as_deref().unwrap_or("GET"))),
            paragraph(&format!(
                "Description: {}",
                c.description.as_deref().unwrap_or("")
            )),
            code(c.example.as_deref().unwrap_or(""), "json"),
        ],
        DocContent::Feature(c) => vec![
            heading_2(&format!("Feature: {}", c.name.as_deref().unwrap_or(""))),
            paragraph(&format!(
                "Status: {}",
                c.status.as_deref().unwrap_or("In development")
            )),
            paragraph(c.description.as_deref().unwrap_or("")),
        ],
        DocContent::BugReport(c) => vec![
            heading_2(&format!("Bug Report: {}", c.title.as_deref().unwrap_or(""))),
            paragraph(&format!(
                "Severity: {}",
                c.severity.as_deref().unwrap_or("Medium")
            )),
            paragraph(&format!(
                "Description: {}",
                c.description.as_deref().unwrap_or("")
            )),
            paragraph(&format!(
                "Steps to reproduce: {}",
                c.steps.as_deref().unwrap_or("")
            )),
        ],
        DocContent::General(c) => vec![paragraph(c.description.as_deref().unwrap_or(""))],
    }
}

/// Render one appended block of the given kind.
///
/// # Errors
///
/// Returns [`ContentError::UnsupportedBlock`] for kinds outside
/// {paragraph, heading, code, list, quote}.
pub fn content_block(
    content_type: &str,
    content: &str,
    language: Option<&str>,
) -> Result<Value, ContentError> {
    match content_type {
        "paragraph" => Ok(paragraph(content)),
        "heading" => Ok(heading_2(content)),
        "code" => Ok(code(content, language.unwrap_or("text"))),
        "quote" => Ok(quote(content)),
        "list" => Ok(bulleted_list_item(content)),
        other => Err(ContentError::UnsupportedBlock(other.to_string())),
    }
}
