//! The document model: records, types, and typed per-type content.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ContentError;

/// The closed set of documentation kinds. Fixed at creation; updates and
/// content appends never change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    ApiEndpoint,
    Feature,
    BugReport,
    General,
}

impl DocType {
    pub const ALL: [DocType; 4] = [
        DocType::ApiEndpoint,
        DocType::Feature,
        DocType::BugReport,
        DocType::General,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DocType::ApiEndpoint => "api_endpoint",
            DocType::Feature => "feature",
            DocType::BugReport => "bug_report",
            DocType::General => "general",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api_endpoint" => Ok(DocType::ApiEndpoint),
            "feature" => Ok(DocType::Feature),
            "bug_report" => Ok(DocType::BugReport),
            "general" => Ok(DocType::General),
            other => Err(ContentError::UnknownType(other.to_string())),
        }
    }
}

/// Section kinds accepted by the `raw_content` log.
pub const CONTENT_KINDS: [&str; 6] = ["paragraph", "heading", "code", "list", "quote", "example"];

/// Render a JSON value as the string stored in a content field. Strings
/// pass through unchanged; anything else keeps its compact JSON encoding.
fn coerce(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn take(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(coerce)
}

/// A patched field overwrites; an absent one leaves the current value.
fn merge_field(slot: &mut Option<String>, patch: Option<String>) {
    if patch.is_some() {
        *slot = patch;
    }
}

/// Content fields for an `api_endpoint` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiEndpointContent {
    /// Endpoint path, e.g. `/users/{id}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// HTTP method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Example response payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl ApiEndpointContent {
    pub const FIELDS: &'static [&'static str] = &[
        "endpoint",
        "method",
        "description",
        "example",
        "parameters",
        "responses",
        "raw_content",
    ];

    fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            endpoint: take(map, "endpoint"),
            method: take(map, "method"),
            description: take(map, "description"),
            example: take(map, "example"),
            parameters: take(map, "parameters"),
            responses: take(map, "responses"),
            raw_content: take(map, "raw_content"),
        }
    }

    fn merge(&mut self, patch: Self) {
        merge_field(&mut self.endpoint, patch.endpoint);
        merge_field(&mut self.method, patch.method);
        merge_field(&mut self.description, patch.description);
        merge_field(&mut self.example, patch.example);
        merge_field(&mut self.parameters, patch.parameters);
        merge_field(&mut self.responses, patch.responses);
        merge_field(&mut self.raw_content, patch.raw_content);
    }
}

/// Content fields for a `feature` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Delivery status, freeform (e.g. "In development").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl FeatureContent {
    pub const FIELDS: &'static [&'static str] = &[
        "name",
        "status",
        "description",
        "requirements",
        "implementation_notes",
        "raw_content",
    ];

    fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            name: take(map, "name"),
            status: take(map, "status"),
            description: take(map, "description"),
            requirements: take(map, "requirements"),
            implementation_notes: take(map, "implementation_notes"),
            raw_content: take(map, "raw_content"),
        }
    }

    fn merge(&mut self, patch: Self) {
        merge_field(&mut self.name, patch.name);
        merge_field(&mut self.status, patch.status);
        merge_field(&mut self.description, patch.description);
        merge_field(&mut self.requirements, patch.requirements);
        merge_field(&mut self.implementation_notes, patch.implementation_notes);
        merge_field(&mut self.raw_content, patch.raw_content);
    }
}

/// Content fields for a `bug_report` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BugReportContent {
    /// Bug title, distinct from the document title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Steps to reproduce.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_behavior: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_behavior: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl BugReportContent {
    pub const FIELDS: &'static [&'static str] = &[
        "title",
        "severity",
        "description",
        "steps",
        "expected_behavior",
        "actual_behavior",
        "raw_content",
    ];

    fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            title: take(map, "title"),
            severity: take(map, "severity"),
            description: take(map, "description"),
            steps: take(map, "steps"),
            expected_behavior: take(map, "expected_behavior"),
            actual_behavior: take(map, "actual_behavior"),
            raw_content: take(map, "raw_content"),
        }
    }

    fn merge(&mut self, patch: Self) {
        merge_field(&mut self.title, patch.title);
        merge_field(&mut self.severity, patch.severity);
        merge_field(&mut self.description, patch.description);
        merge_field(&mut self.steps, patch.steps);
        merge_field(&mut self.expected_behavior, patch.expected_behavior);
        merge_field(&mut self.actual_behavior, patch.actual_behavior);
        merge_field(&mut self.raw_content, patch.raw_content);
    }
}

/// Content fields for a `general` document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneralContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Main body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,
}

impl GeneralContent {
    pub const FIELDS: &'static [&'static str] = &["description", "content", "notes", "raw_content"];

    fn from_object(map: &Map<String, Value>) -> Self {
        Self {
            description: take(map, "description"),
            content: take(map, "content"),
            notes: take(map, "notes"),
            raw_content: take(map, "raw_content"),
        }
    }

    fn merge(&mut self, patch: Self) {
        merge_field(&mut self.description, patch.description);
        merge_field(&mut self.content, patch.content);
        merge_field(&mut self.notes, patch.notes);
        merge_field(&mut self.raw_content, patch.raw_content);
    }
}

/// Type-specific document content, one variant per [`DocType`].
///
/// Serialized untagged: the document's sibling `doc_type` field selects the
/// variant on read, so the `content` object stays flat on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DocContent {
    ApiEndpoint(ApiEndpointContent),
    Feature(FeatureContent),
    BugReport(BugReportContent),
    General(GeneralContent),
}

impl DocContent {
    /// Empty content of the matching variant.
    #[must_use]
    pub fn empty(doc_type: DocType) -> Self {
        match doc_type {
            DocType::ApiEndpoint => DocContent::ApiEndpoint(ApiEndpointContent::default()),
            DocType::Feature => DocContent::Feature(FeatureContent::default()),
            DocType::BugReport => DocContent::BugReport(BugReportContent::default()),
            DocType::General => DocContent::General(GeneralContent::default()),
        }
    }

    #[must_use]
    pub fn doc_type(&self) -> DocType {
        match self {
            DocContent::ApiEndpoint(_) => DocType::ApiEndpoint,
            DocContent::Feature(_) => DocType::Feature,
            DocContent::BugReport(_) => DocType::BugReport,
            DocContent::General(_) => DocType::General,
        }
    }

    /// The field names a document type accepts.
    #[must_use]
    pub fn allowed_fields(doc_type: DocType) -> &'static [&'static str] {
        match doc_type {
            DocType::ApiEndpoint => ApiEndpointContent::FIELDS,
            DocType::Feature => FeatureContent::FIELDS,
            DocType::BugReport => BugReportContent::FIELDS,
            DocType::General => GeneralContent::FIELDS,
        }
    }

    /// Parse user-supplied content strictly. Field names outside the type's
    /// set are rejected; non-string values for known fields keep their
    /// compact JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::NotAnObject`] when `value` is not a JSON
    /// object, and [`ContentError::UnknownField`] on field-name drift.
    pub fn from_user_value(doc_type: DocType, value: &Value) -> Result<Self, ContentError> {
        let map = value
            .as_object()
            .ok_or_else(|| ContentError::NotAnObject(json_kind(value).to_string()))?;
        let allowed = Self::allowed_fields(doc_type);
        for key in map.keys() {
            if !allowed.contains(&key.as_str()) {
                return Err(ContentError::UnknownField {
                    doc_type: doc_type.to_string(),
                    field: key.clone(),
                });
            }
        }
        Ok(Self::from_object(doc_type, map))
    }

    /// Parse content leniently: known fields are extracted, unknown fields
    /// dropped, non-objects treated as empty. Used for stored files and
    /// model output, which must never fail to load.
    #[must_use]
    pub fn from_value_lenient(doc_type: DocType, value: &Value) -> Self {
        match value.as_object() {
            Some(map) => Self::from_object(doc_type, map),
            None => Self::empty(doc_type),
        }
    }

    fn from_object(doc_type: DocType, map: &Map<String, Value>) -> Self {
        match doc_type {
            DocType::ApiEndpoint => DocContent::ApiEndpoint(ApiEndpointContent::from_object(map)),
            DocType::Feature => DocContent::Feature(FeatureContent::from_object(map)),
            DocType::BugReport => DocContent::BugReport(BugReportContent::from_object(map)),
            DocType::General => DocContent::General(GeneralContent::from_object(map)),
        }
    }

    /// Merge a patch into this content, field by field. Patched fields
    /// overwrite; absent fields keep their current value.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::VariantMismatch`] when the patch was parsed
    /// for a different document type.
    pub fn merge(&mut self, patch: DocContent) -> Result<(), ContentError> {
        match (self, patch) {
            (DocContent::ApiEndpoint(current), DocContent::ApiEndpoint(patch)) => {
                current.merge(patch);
                Ok(())
            }
            (DocContent::Feature(current), DocContent::Feature(patch)) => {
                current.merge(patch);
                Ok(())
            }
            (DocContent::BugReport(current), DocContent::BugReport(patch)) => {
                current.merge(patch);
                Ok(())
            }
            (DocContent::General(current), DocContent::General(patch)) => {
                current.merge(patch);
                Ok(())
            }
            (current, patch) => Err(ContentError::VariantMismatch {
                expected: current.doc_type().to_string(),
                actual: patch.doc_type().to_string(),
            }),
        }
    }

    /// The `description` field, present on every variant.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            DocContent::ApiEndpoint(c) => c.description.as_deref(),
            DocContent::Feature(c) => c.description.as_deref(),
            DocContent::BugReport(c) => c.description.as_deref(),
            DocContent::General(c) => c.description.as_deref(),
        }
    }

    /// The `name` field (feature documents only).
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            DocContent::Feature(c) => c.name.as_deref(),
            _ => None,
        }
    }

    /// The content-level `title` field (bug reports only).
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self {
            DocContent::BugReport(c) => c.title.as_deref(),
            _ => None,
        }
    }

    /// The accumulated free-text log, present on every variant.
    #[must_use]
    pub fn raw_content(&self) -> Option<&str> {
        match self {
            DocContent::ApiEndpoint(c) => c.raw_content.as_deref(),
            DocContent::Feature(c) => c.raw_content.as_deref(),
            DocContent::BugReport(c) => c.raw_content.as_deref(),
            DocContent::General(c) => c.raw_content.as_deref(),
        }
    }

    pub fn set_description(&mut self, description: String) {
        match self {
            DocContent::ApiEndpoint(c) => c.description = Some(description),
            DocContent::Feature(c) => c.description = Some(description),
            DocContent::BugReport(c) => c.description = Some(description),
            DocContent::General(c) => c.description = Some(description),
        }
    }

    pub fn set_raw_content(&mut self, raw: String) {
        match self {
            DocContent::ApiEndpoint(c) => c.raw_content = Some(raw),
            DocContent::Feature(c) => c.raw_content = Some(raw),
            DocContent::BugReport(c) => c.raw_content = Some(raw),
            DocContent::General(c) => c.raw_content = Some(raw),
        }
    }

    /// Append a section to the `raw_content` log. The log is seeded from
    /// `description` the first time; the section heading is the upper-cased
    /// content kind.
    pub fn append_section(&mut self, kind: &str, body: &str) {
        let seed = self
            .raw_content()
            .or_else(|| self.description())
            .unwrap_or("")
            .to_string();
        let log = format!("{seed}\n\n## {}\n{body}", kind.to_uppercase());
        self.set_raw_content(log);
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A persisted documentation record. The store file holds a JSON array of
/// these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub doc_type: DocType,
    pub content: DocContent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Reference to a parent document. Never validated; dangling references
    /// are permitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Carried on every record but never populated by any operation.
    pub tags: Vec<String>,
}

impl Document {
    /// Build a fresh document. `created_at` and `updated_at` start equal;
    /// `doc_type` always matches the content variant.
    #[must_use]
    pub fn new(id: String, title: String, content: DocContent, parent_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            title,
            doc_type: content.doc_type(),
            content,
            created_at: now,
            updated_at: now,
            parent_id,
            tags: Vec::new(),
        }
    }

    /// Refresh `updated_at`. Every mutation goes through this.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// Reading goes through a raw form so the content variant can be selected by
// the sibling `doc_type` field. Stored content is parsed leniently: a store
// file written by an older field set must still load.
#[derive(Deserialize)]
struct RawDocument {
    id: String,
    title: String,
    doc_type: DocType,
    #[serde(default)]
    content: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    parent_id: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawDocument::deserialize(deserializer)?;
        let content = DocContent::from_value_lenient(raw.doc_type, &raw.content);
        Ok(Document {
            id: raw.id,
            title: raw.title,
            doc_type: raw.doc_type,
            content,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            parent_id: raw.parent_id,
            tags: raw.tags,
        })
    }
}
