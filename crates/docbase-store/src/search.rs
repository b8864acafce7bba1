//! Case-insensitive substring search over document fields.

use docbase_core::{DocType, Document};

/// Filter documents by a case-insensitive substring over the title, the
/// content description, the feature name, and the bug-report title.
///
/// An empty query matches everything; the type filter applies either way.
/// Results keep store order.
#[must_use]
pub fn substring_search<'a>(
    docs: &'a [Document],
    query: &str,
    filter_type: Option<DocType>,
) -> Vec<&'a Document> {
    let matches_type = |doc: &Document| filter_type.map_or(true, |t| doc.doc_type == t);

    if query.is_empty() {
        return docs.iter().filter(|doc| matches_type(doc)).collect();
    }

    let needle = query.to_lowercase();
    docs.iter()
        .filter(|doc| {
            let haystack = format!(
                "{} {} {} {}",
                doc.title,
                doc.content.description().unwrap_or(""),
                doc.content.name().unwrap_or(""),
                doc.content.title().unwrap_or(""),
            )
            .to_lowercase();
            matches_type(doc) && haystack.contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbase_core::DocContent;
    use serde_json::json;

    fn doc(id: &str, title: &str, doc_type: DocType, content: serde_json::Value) -> Document {
        Document::new(
            id.to_string(),
            title.to_string(),
            DocContent::from_user_value(doc_type, &content).unwrap(),
            None,
        )
    }

    fn corpus() -> Vec<Document> {
        vec![
            doc(
                "1",
                "Payments API",
                DocType::ApiEndpoint,
                json!({ "endpoint": "/payments", "description": "Process card charges" }),
            ),
            doc(
                "2",
                "Checkout revamp",
                DocType::Feature,
                json!({ "name": "express checkout" }),
            ),
            doc(
                "3",
                "Crash on save",
                DocType::BugReport,
                json!({ "title": "NPE in payments flow" }),
            ),
        ]
    }

    #[test]
    fn empty_query_returns_everything_in_store_order() {
        let docs = corpus();
        let hits = substring_search(&docs, "", None);
        let ids: Vec<&str> = hits.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn empty_query_still_honors_the_type_filter() {
        let docs = corpus();
        let hits = substring_search(&docs, "", Some(DocType::Feature));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "2");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let docs = corpus();
        let hits = substring_search(&docs, "PAYMENTS", None);
        let ids: Vec<&str> = hits.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
    }

    #[test]
    fn descriptions_and_names_are_searched() {
        let docs = corpus();
        assert_eq!(substring_search(&docs, "card charges", None).len(), 1);
        assert_eq!(substring_search(&docs, "express", None).len(), 1);
        assert_eq!(substring_search(&docs, "npe", None).len(), 1);
    }

    #[test]
    fn type_filter_combines_with_the_query() {
        let docs = corpus();
        let hits = substring_search(&docs, "payments", Some(DocType::BugReport));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "3");
    }

    #[test]
    fn no_match_returns_empty() {
        let docs = corpus();
        assert!(substring_search(&docs, "quantum", None).is_empty());
    }
}
