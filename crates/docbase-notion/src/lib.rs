//! # docbase-notion
//!
//! The Notion proxy side of docbase: a three-verb REST client and the
//! block payloads that render typed documentation content as Notion
//! blocks. No state lives locally; every operation is one HTTP call.

pub mod blocks;
pub mod client;

pub use blocks::{content_block, documentation_blocks};
pub use client::{NotionClient, DEFAULT_BASE_URL, NOTION_API_VERSION};
