//! # docbase-core
//!
//! Core types for the docbase documentation servers.
//!
//! This crate defines the types shared by every other docbase crate:
//! - [`Document`] — a persisted documentation record
//! - [`DocType`] — the closed set of documentation kinds
//! - [`DocContent`] — type-specific content, one variant per [`DocType`]
//! - [`Degraded`] — a successful value plus an optional fallback reason
//! - The error hierarchy ([`DocbaseError`], [`ContentError`])

pub mod degraded;
pub mod document;
pub mod error;

pub use degraded::Degraded;
pub use document::{
    ApiEndpointContent, BugReportContent, DocContent, DocType, Document, FeatureContent,
    GeneralContent, CONTENT_KINDS,
};
pub use error::{ContentError, DocbaseError, Result};
