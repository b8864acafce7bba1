//! # docbase-store
//!
//! JSON-file persistence and text search for docbase documents.
//!
//! The backing file is the sole owner of the collection: every operation
//! reloads it from disk and rewrites it wholesale. Reads degrade to an
//! empty collection instead of failing; writes raise.

pub mod search;
pub mod store;

pub use search::substring_search;
pub use store::{find_by_id, position_by_id, DocStore};
