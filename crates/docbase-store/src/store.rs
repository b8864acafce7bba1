//! The JSON-file document store.

use std::fs;
use std::path::{Path, PathBuf};

use docbase_core::{Degraded, DocbaseError, Document, Result};

/// Loads and saves a JSON array of documents at a fixed path.
///
/// `load` never raises: an unreadable or unparseable file degrades to an
/// empty collection so a damaged store cannot take the server down. `save`
/// raises, because a lost write is for the calling operation to surface.
#[derive(Debug, Clone)]
pub struct DocStore {
    path: PathBuf,
}

impl DocStore {
    /// Wrap an existing path without touching the file system.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open a store, creating the parent directory and seeding the file
    /// with an empty array when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`DocbaseError::Io`] when the directory or seed file cannot
    /// be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if !path.exists() {
            fs::write(&path, "[]")?;
        }
        Ok(Self { path })
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the whole collection.
    ///
    /// Never raises: any read or parse failure yields an empty collection
    /// with the failure recorded (and logged) as the degradation reason.
    #[must_use]
    pub fn load(&self) -> Degraded<Vec<Document>> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) => {
                let reason = format!("failed to read store file: {e}");
                tracing::warn!(path = %self.path.display(), %reason, "store load degraded");
                return Degraded::degraded(Vec::new(), reason);
            }
        };
        match serde_json::from_str(&data) {
            Ok(docs) => Degraded::ok(docs),
            Err(e) => {
                let reason = format!("failed to parse store file: {e}");
                tracing::warn!(path = %self.path.display(), %reason, "store load degraded");
                Degraded::degraded(Vec::new(), reason)
            }
        }
    }

    /// Serialize and overwrite the whole collection, pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns [`DocbaseError::Serialization`] when encoding fails and
    /// [`DocbaseError::Io`] when the write fails.
    pub fn save(&self, docs: &[Document]) -> Result<()> {
        let data = serde_json::to_string_pretty(docs)
            .map_err(|e| DocbaseError::Serialization(e.to_string()))?;
        fs::write(&self.path, data)?;
        Ok(())
    }

    /// Generate a fresh document id (time-ordered entropy, collision-safe).
    #[must_use]
    pub fn generate_id() -> String {
        cuid2::create_id()
    }
}

/// First document with the given id, if any.
#[must_use]
pub fn find_by_id<'a>(docs: &'a [Document], id: &str) -> Option<&'a Document> {
    docs.iter().find(|doc| doc.id == id)
}

/// Index of the first document with the given id, for in-place mutation.
#[must_use]
pub fn position_by_id(docs: &[Document], id: &str) -> Option<usize> {
    docs.iter().position(|doc| doc.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbase_core::{DocContent, DocType};
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn doc(id: &str, title: &str) -> Document {
        Document::new(
            id.to_string(),
            title.to_string(),
            DocContent::empty(DocType::General),
            None,
        )
    }

    #[test]
    fn open_seeds_a_missing_file_with_an_empty_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("documentation.json");
        let store = DocStore::open(&path).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[test]
    fn open_keeps_an_existing_file_intact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("documentation.json");
        fs::write(&path, "[{\"bad\": true}]").unwrap();
        DocStore::open(&path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[{\"bad\": true}]");
    }

    #[test]
    fn load_of_a_missing_file_degrades_to_empty() {
        let store = DocStore::new("/nonexistent/documentation.json");
        let loaded = store.load();
        assert!(loaded.value.is_empty());
        assert!(loaded.is_degraded());
    }

    #[test]
    fn load_of_a_corrupt_file_degrades_to_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("documentation.json");
        fs::write(&path, "{ not json").unwrap();
        let loaded = DocStore::new(&path).load();
        assert!(loaded.value.is_empty());
        assert!(loaded.reason.unwrap().contains("parse"));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = DocStore::open(dir.path().join("documentation.json")).unwrap();
        let docs = vec![doc("a", "Alpha"), doc("b", "Beta")];
        store.save(&docs).unwrap();
        let loaded = store.load();
        assert!(!loaded.is_degraded());
        assert_eq!(loaded.value, docs);
    }

    #[test]
    fn resaving_a_loaded_collection_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = DocStore::open(dir.path().join("documentation.json")).unwrap();
        store.save(&[doc("a", "Alpha")]).unwrap();

        let before: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        store.save(&store.load().value).unwrap();
        let after: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn lookups_find_documents_by_id() {
        let docs = vec![doc("a", "Alpha"), doc("b", "Beta")];
        assert_eq!(find_by_id(&docs, "b").map(|d| d.title.as_str()), Some("Beta"));
        assert_eq!(position_by_id(&docs, "a"), Some(0));
        assert!(find_by_id(&docs, "zz").is_none());
        assert!(position_by_id(&docs, "zz").is_none());
    }

    #[test]
    fn generated_ids_are_unique() {
        let ids: HashSet<String> = (0..100).map(|_| DocStore::generate_id()).collect();
        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(|id| !id.is_empty()));
    }
}
