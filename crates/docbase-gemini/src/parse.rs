//! Best-effort parsing of model replies. Nothing in this module raises:
//! malformed output degrades to plain-text storage.

use docbase_core::{Degraded, DocContent, DocType};
use serde_json::Value;

/// Extract typed content from an enrichment reply.
///
/// The reply is scanned for a brace-delimited JSON object (first `{` to
/// last `}`). On a parse hit the known fields are taken leniently and the
/// full reply is kept as `raw_content`; otherwise the whole reply becomes
/// the description and the degradation reason says why.
#[must_use]
pub fn parse_content_reply(reply: &str, doc_type: DocType) -> Degraded<DocContent> {
    if let Some(value) = extract_json_object(reply) {
        let mut content = DocContent::from_value_lenient(doc_type, &value);
        content.set_raw_content(reply.to_string());
        return Degraded::ok(content);
    }
    let reason = "reply carried no parseable JSON object; stored as plain text";
    tracing::warn!(%doc_type, reason, "enrichment reply degraded");
    let mut content = DocContent::empty(doc_type);
    content.set_description(reply.to_string());
    content.set_raw_content(reply.to_string());
    Degraded::degraded(content, reason)
}

fn extract_json_object(reply: &str) -> Option<Value> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str::<Value>(&reply[start..=end])
        .ok()
        .filter(Value::is_object)
}

/// Parse a ranking reply into an ordered id list.
///
/// `None` means "no relevant documents": the sentinel `none` (checked
/// case-insensitively on the first element) or a reply with no usable ids.
/// The ids are not validated here; callers skip ones that match nothing.
#[must_use]
pub fn parse_ranked_ids(reply: &str) -> Option<Vec<String>> {
    let ids: Vec<String> = reply
        .trim()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    match ids.first() {
        None => None,
        Some(first) if first.eq_ignore_ascii_case("none") => None,
        Some(_) => Some(ids),
    }
}
