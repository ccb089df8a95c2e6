//! Ledger persistence keyed by project id.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::edit::StyleEdit;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("ledger I/O failed for project {project}: {source}")]
    Io {
        project: String,
        #[source]
        source: io::Error,
    },
    #[error("ledger for project {project} is malformed: {source}")]
    Format {
        project: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A host-provided key-value store for ledgers.
pub trait LedgerStore {
    /// The stored ledger, or an empty one when the project has none.
    fn load(&self, project_id: &str) -> Result<Vec<StyleEdit>, StoreError>;

    fn save(&mut self, project_id: &str, edits: &[StyleEdit]) -> Result<(), StoreError>;

    fn delete(&mut self, project_id: &str) -> Result<(), StoreError>;
}

/// In-memory store. Counts writes so callers can observe coalescing.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    ledgers: HashMap<String, Vec<StyleEdit>>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn get(&self, project_id: &str) -> Option<&[StyleEdit]> {
        self.ledgers.get(project_id).map(Vec::as_slice)
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self, project_id: &str) -> Result<Vec<StyleEdit>, StoreError> {
        Ok(self.ledgers.get(project_id).cloned().unwrap_or_default())
    }

    fn save(&mut self, project_id: &str, edits: &[StyleEdit]) -> Result<(), StoreError> {
        self.writes += 1;
        self.ledgers.insert(project_id.to_string(), edits.to_vec());
        Ok(())
    }

    fn delete(&mut self, project_id: &str) -> Result<(), StoreError> {
        self.ledgers.remove(project_id);
        Ok(())
    }
}

/// One `<project-id>.json` file per project under a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File for `project_id`. ASCII letters, digits and `-` are kept; every
    /// other byte, `_` included, becomes `_XX` in hex. The mapping is
    /// injective and never leaves the directory.
    pub fn path_for(&self, project_id: &str) -> PathBuf {
        let mut name = String::with_capacity(project_id.len());
        for byte in project_id.bytes() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                name.push(char::from(byte));
            } else {
                name.push_str(&format!("_{byte:02X}"));
            }
        }
        self.dir.join(format!("{name}.json"))
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self, project_id: &str) -> Result<Vec<StyleEdit>, StoreError> {
        let path = self.path_for(project_id);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    project: project_id.to_string(),
                    source,
                })
            }
        };
        serde_json::from_str(&text).map_err(|source| StoreError::Format {
            project: project_id.to_string(),
            source,
        })
    }

    fn save(&mut self, project_id: &str, edits: &[StyleEdit]) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            project: project_id.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let json = serde_json::to_string_pretty(edits).map_err(|source| StoreError::Format {
            project: project_id.to_string(),
            source,
        })?;
        let path = self.path_for(project_id);
        fs::write(&path, json).map_err(io_err)?;
        debug!(path = %path.display(), entries = edits.len(), "ledger saved");
        Ok(())
    }

    fn delete(&mut self, project_id: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(project_id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                project: project_id.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn edit(selector: &str, value: &str) -> StyleEdit {
        StyleEdit {
            selector: selector.into(),
            property: "color".into(),
            value: value.into(),
            timestamp: 1,
        }
    }

    #[test]
    fn memory_store_counts_writes() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load("p").unwrap(), Vec::new());
        store.save("p", &[edit("#a", "red")]).unwrap();
        store.save("p", &[edit("#a", "blue")]).unwrap();
        assert_eq!(store.writes(), 2);
        assert_eq!(store.load("p").unwrap(), vec![edit("#a", "blue")]);
        store.delete("p").unwrap();
        assert_eq!(store.get("p"), None);
    }

    #[test]
    fn file_store_round_trips_and_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("ledgers"));
        let edits = vec![edit(".hero-title", "#00ff00"), edit("p:nth-of-type(2)", "#111")];
        store.save("proj-1", &edits).unwrap();
        assert!(store.path_for("proj-1").ends_with("proj-1.json"));
        assert_eq!(store.load("proj-1").unwrap(), edits);

        store.delete("proj-1").unwrap();
        assert_eq!(store.load("proj-1").unwrap(), Vec::new());
        store.delete("proj-1").unwrap();
    }

    #[test]
    fn malformed_file_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        fs::write(store.path_for("bad"), "{not json").unwrap();
        assert!(matches!(store.load("bad"), Err(StoreError::Format { .. })));
    }

    #[test]
    fn ids_cannot_escape_the_directory() {
        let store = JsonFileStore::new("/data");
        assert_eq!(
            store.path_for("../etc/passwd"),
            PathBuf::from("/data/_2E_2E_2Fetc_2Fpasswd.json")
        );
    }

    #[test]
    fn distinct_ids_get_distinct_files() {
        let store = JsonFileStore::new("/data");
        assert_eq!(store.path_for("landing-2"), PathBuf::from("/data/landing-2.json"));
        let paths: std::collections::HashSet<PathBuf> =
            ["a/b", "a.b", "a_b", "a_2Fb"].iter().map(|id| store.path_for(id)).collect();
        assert_eq!(paths.len(), 4);
    }

    #[test]
    fn similar_ids_keep_separate_ledgers() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path());
        store.save("a/b", &[edit("h1", "red")]).unwrap();
        store.save("a.b", &[edit("h1", "blue")]).unwrap();
        assert_eq!(store.load("a/b").unwrap()[0].value, "red");
        assert_eq!(store.load("a.b").unwrap()[0].value, "blue");
        assert!(store.load("a_b").unwrap().is_empty());
    }
}
