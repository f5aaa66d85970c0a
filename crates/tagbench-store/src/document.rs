//! Document text bound to one tag store

use std::path::{Path, PathBuf};
use tagbench_span::char_len;

/// Raw document text plus where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    path: PathBuf,
    text: String,
    char_len: usize,
}

impl Document {
    /// Create a document
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            path: path.into(),
            char_len: char_len(&text),
            text,
        }
    }

    /// Source path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Base file name, used as tag provenance
    #[must_use]
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map_or_else(|| self.path.display().to_string(), |n| n.to_string_lossy().into_owned())
    }

    /// Full text
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters
    #[inline]
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.char_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_base_name() {
        let doc = Document::new("/data/batch1/story.txt", "Jöhn ran");
        assert_eq!(doc.name(), "story.txt");
        assert_eq!(doc.char_len(), 8);
        assert_eq!(doc.text().len(), 9);
    }
}
