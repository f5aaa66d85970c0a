//! Document sources
//!
//! A [`DocumentSource`] hands the session raw text plus any tag records to
//! seed the new store with.
//!
//! # Available Sources
//!
//! - [`TextDocument`]: text (and optional records) already in memory, or read
//!   from a plain text file
//! - [`SnapshotFile`]: a JSON [`DocumentSnapshot`] written by a previous save

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tagbench_store::{Document, DocumentSnapshot, TagRecord};

/// Document text and the records to seed its store with
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Text bound to the store
    pub document: Document,
    /// Pre-existing tags
    pub records: Vec<TagRecord>,
}

/// External document loader
pub trait DocumentSource: Debug {
    /// Path identifying the document within a session
    fn path(&self) -> &Path;

    /// Read text and records
    ///
    /// # Errors
    /// Returns an error if the source cannot be read or decoded
    fn load(&self) -> Result<LoadedDocument, DocumentError>;
}

/// Document read failures
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// File could not be read
    #[error("failed to read document '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot JSON is malformed
    #[error("invalid document snapshot: {0}")]
    Json(#[from] serde_json::Error),
}

/// Text held in memory
#[derive(Debug, Clone)]
pub struct TextDocument {
    path: PathBuf,
    text: String,
    records: Vec<TagRecord>,
}

impl TextDocument {
    /// Create from text
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            records: Vec::new(),
        }
    }

    /// Read a plain text file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read
    pub fn read(path: impl Into<PathBuf>) -> Result<Self, DocumentError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|source| DocumentError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self::new(path, text))
    }

    /// With records to seed the store
    #[must_use]
    pub fn with_records(mut self, records: Vec<TagRecord>) -> Self {
        self.records = records;
        self
    }
}

impl DocumentSource for TextDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<LoadedDocument, DocumentError> {
        Ok(LoadedDocument {
            document: Document::new(&self.path, self.text.clone()),
            records: self.records.clone(),
        })
    }
}

/// Snapshot saved as JSON
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    /// Create source for a snapshot path
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read and decode the snapshot
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or decoded
    pub fn read_snapshot(&self) -> Result<DocumentSnapshot, DocumentError> {
        let raw = std::fs::read_to_string(&self.path).map_err(|source| DocumentError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(DocumentSnapshot::from_json_str(&raw)?)
    }
}

impl DocumentSource for SnapshotFile {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<LoadedDocument, DocumentError> {
        let snapshot = self.read_snapshot()?;
        // The annotated document sits next to its snapshot
        let path = if snapshot.document.is_empty() {
            self.path.clone()
        } else {
            self.path.with_file_name(&snapshot.document)
        };
        Ok(LoadedDocument {
            document: Document::new(path, snapshot.text),
            records: snapshot.tags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_document_loads_in_memory() {
        let source = TextDocument::new("a.txt", "hello");
        let loaded = source.load().unwrap();
        assert_eq!(loaded.document.text(), "hello");
        assert!(loaded.records.is_empty());
    }

    #[test]
    fn text_document_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story.txt");
        std::fs::write(&path, "John ran").unwrap();
        let loaded = TextDocument::read(&path).unwrap().load().unwrap();
        assert_eq!(loaded.document.name(), "story.txt");
    }

    #[test]
    fn snapshot_names_the_annotated_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("story_gold.json");
        let snapshot = DocumentSnapshot {
            task: "ner".into(),
            document: "story.txt".into(),
            text: "John ran".into(),
            tags: Vec::new(),
        };
        std::fs::write(&path, snapshot.to_json_string().unwrap()).unwrap();

        let source = SnapshotFile::new(&path);
        let loaded = source.load().unwrap();
        assert_eq!(loaded.document.name(), "story.txt");
        assert_eq!(loaded.document.text(), "John ran");
        assert_eq!(source.path(), path.as_path());
    }

    #[test]
    fn snapshot_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = SnapshotFile::new(dir.path().join("none.json"));
        assert!(matches!(missing.load(), Err(DocumentError::Io { .. })));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{").unwrap();
        assert!(matches!(
            SnapshotFile::new(&bad).load(),
            Err(DocumentError::Json(_))
        ));
    }
}
