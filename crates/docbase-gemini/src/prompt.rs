//! Prompt templates for the generative backend, one per operation.
//!
//! Every template is deterministic: the same document state always renders
//! the same prompt. Content is inlined as pretty-printed JSON so the model
//! sees exactly the fields it is asked to fill.

use docbase_core::{DocContent, DocType, Document};

fn pretty(content: &DocContent) -> String {
    serde_json::to_string_pretty(content).unwrap_or_else(|_| "{}".to_string())
}

/// Per-type JSON skeleton the model is asked to fill in.
fn skeleton(doc_type: DocType) -> &'static str {
    match doc_type {
        DocType::ApiEndpoint => {
            r#"{
  "endpoint": "endpoint path",
  "method": "HTTP method",
  "description": "detailed description of the endpoint",
  "example": "example JSON response",
  "parameters": "required parameters",
  "responses": "possible response codes"
}"#
        }
        DocType::Feature => {
            r#"{
  "name": "feature name",
  "status": "current status",
  "description": "full description of the feature",
  "requirements": "technical requirements",
  "implementation_notes": "implementation notes"
}"#
        }
        DocType::BugReport => {
            r#"{
  "title": "bug title",
  "severity": "severity level",
  "description": "description of the problem",
  "steps": "steps to reproduce",
  "expected_behavior": "expected behavior",
  "actual_behavior": "actual behavior"
}"#
        }
        DocType::General => {
            r#"{
  "description": "full description of the document",
  "content": "main content",
  "notes": "additional notes"
}"#
        }
    }
}

/// Prompt asking the model to draft or enhance a document's content.
#[must_use]
pub fn create_prompt(doc_type: DocType, title: &str, content: &DocContent) -> String {
    format!(
        "Create detailed documentation for: \"{title}\"\n\
         Type: {doc_type}\n\
         Existing content: {}\n\n\
         Return the reply as JSON with the following structure:\n{}",
        pretty(content),
        skeleton(doc_type),
    )
}

/// Prompt asking the model to improve a freshly submitted description.
#[must_use]
pub fn update_description_prompt(
    description: &str,
    doc_type: DocType,
    content: &DocContent,
) -> String {
    format!(
        "Improve the following technical documentation description:\n\
         \"{description}\"\n\n\
         Document type: {doc_type}\n\
         Existing context: {}\n\n\
         Return an improved, more detailed version keeping the format \
         appropriate for the document type:\n",
        pretty(content),
    )
}

/// Prompt asking the model to pick relevant document ids for a query.
///
/// The reply contract is a comma-separated id list or the literal `none`;
/// see [`crate::parse::parse_ranked_ids`].
#[must_use]
pub fn ranking_prompt(query: &str, docs: &[Document]) -> String {
    let listing: Vec<String> = docs
        .iter()
        .map(|doc| {
            format!(
                "- {}: {}",
                doc.title,
                doc.content.description().unwrap_or("No description"),
            )
        })
        .collect();
    format!(
        "Analyze the following search query: \"{query}\"\n\n\
         Available documents:\n{}\n\n\
         Return ONLY the ids of the most relevant documents separated by \
         commas, or \"none\" if nothing matches:\n",
        listing.join("\n"),
    )
}

/// Prompt asking the model for an executive summary of the whole corpus.
#[must_use]
pub fn summary_prompt(docs: &[Document]) -> String {
    let entries: Vec<String> = docs
        .iter()
        .map(|doc| {
            format!(
                "\nTitle: {}\nType: {}\nDescription: {}\nLast updated: {}\n",
                doc.title,
                doc.doc_type,
                doc.content.description().unwrap_or("No description"),
                doc.updated_at.to_rfc3339(),
            )
        })
        .collect();
    format!(
        "Generate an executive summary of the following technical \
         documentation:\n\n{}\n\n\
         Write an executive summary covering:\n\
         1. Overall project state\n\
         2. Main APIs and their functionality\n\
         3. Features in development\n\
         4. Known problems (bugs)\n\
         5. Recommendations\n",
        entries.join("\n---\n"),
    )
}

/// Prompt asking the model to answer a query against the full corpus.
#[must_use]
pub fn analysis_prompt(query: &str, docs: &[Document]) -> String {
    let entries: Vec<String> = docs
        .iter()
        .map(|doc| {
            format!(
                "\nID: {}\nTitle: {}\nType: {}\nContent: {}\n",
                doc.id,
                doc.title,
                doc.doc_type,
                pretty(&doc.content),
            )
        })
        .collect();
    format!(
        "Analyze the following technical documentation based on the query: \
         \"{query}\"\n\n\
         Available documentation:\n{}\n\n\
         Provide a detailed analysis answering the specific query.\n",
        entries.join("\n---\n"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, title: &str, description: Option<&str>) -> Document {
        let mut content = DocContent::empty(DocType::General);
        if let Some(d) = description {
            content.set_description(d.to_string());
        }
        Document::new(id.to_string(), title.to_string(), content, None)
    }

    #[test]
    fn create_prompt_embeds_title_type_and_skeleton() {
        let content = DocContent::from_user_value(
            DocType::ApiEndpoint,
            &json!({ "endpoint": "/users" }),
        )
        .unwrap();
        let prompt = create_prompt(DocType::ApiEndpoint, "Users API", &content);
        assert!(prompt.contains("Create detailed documentation for: \"Users API\""));
        assert!(prompt.contains("Type: api_endpoint"));
        assert!(prompt.contains("\"endpoint\": \"/users\""));
        assert!(prompt.contains("\"responses\": \"possible response codes\""));
    }

    #[test]
    fn skeletons_list_exactly_the_type_fields() {
        for doc_type in DocType::ALL {
            let text = skeleton(doc_type);
            for field in DocContent::allowed_fields(doc_type) {
                // raw_content is backend-side only; the model never fills it.
                if *field == "raw_content" {
                    continue;
                }
                assert!(
                    text.contains(&format!("\"{field}\"")),
                    "{doc_type} skeleton is missing {field}"
                );
            }
        }
    }

    #[test]
    fn update_prompt_carries_the_submitted_description() {
        let content = DocContent::empty(DocType::Feature);
        let prompt = update_description_prompt("shorter text", DocType::Feature, &content);
        assert!(prompt.contains("\"shorter text\""));
        assert!(prompt.contains("Document type: feature"));
    }

    #[test]
    fn ranking_prompt_lists_one_line_per_document() {
        let docs = vec![
            doc("a", "Alpha", Some("first doc")),
            doc("b", "Beta", None),
        ];
        let prompt = ranking_prompt("payments", &docs);
        assert!(prompt.contains("\"payments\""));
        assert!(prompt.contains("- Alpha: first doc"));
        assert!(prompt.contains("- Beta: No description"));
        assert!(prompt.contains("\"none\""));
    }

    #[test]
    fn summary_prompt_separates_documents() {
        let docs = vec![doc("a", "Alpha", None), doc("b", "Beta", None)];
        let prompt = summary_prompt(&docs);
        assert!(prompt.contains("Title: Alpha"));
        assert!(prompt.contains("Title: Beta"));
        assert!(prompt.contains("\n---\n"));
    }

    #[test]
    fn analysis_prompt_dumps_ids_and_full_content() {
        let docs = vec![doc("doc-7", "Alpha", Some("details"))];
        let prompt = analysis_prompt("what is alpha?", &docs);
        assert!(prompt.contains("ID: doc-7"));
        assert!(prompt.contains("\"description\": \"details\""));
        assert!(prompt.contains("\"what is alpha?\""));
    }
}
