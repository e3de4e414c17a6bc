//! Graph writer: persists converted documents as a Logseq graph.
//!
//! Pages land in `<root>/pages`, date-named pages (`yyyy_MM_dd`) in
//! `<root>/journals`.

use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use wf2ls_core::{Document, Result};

static JOURNAL_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}_[0-9]{2}_[0-9]{2}$").unwrap());

/// Logseq's file-name encoding of the namespace separator
const NAMESPACE_SEPARATOR: &str = "___";

/// Whether `name` belongs in the journals folder
pub fn is_journal_page(name: &str) -> bool {
    JOURNAL_PAGE.is_match(name)
}

/// File name for a page
pub fn page_file_name(name: &str) -> String {
    format!("{}.md", name.replace('/', NAMESPACE_SEPARATOR))
}

/// What a write produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub root: PathBuf,
    pub pages: usize,
    pub journals: usize,
    pub files: Vec<PathBuf>,
}

impl WriteSummary {
    /// Number of files written
    pub fn total(&self) -> usize {
        self.pages + self.journals
    }
}

/// Writes documents below a graph root
#[derive(Debug, Clone)]
pub struct GraphWriter {
    root: PathBuf,
}

impl GraphWriter {
    /// Writer for the graph rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Graph root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding regular pages
    pub fn pages_dir(&self) -> PathBuf {
        self.root.join("pages")
    }

    /// Directory holding journal pages
    pub fn journals_dir(&self) -> PathBuf {
        self.root.join("journals")
    }

    /// Create the root, `pages` and `journals` directories when missing
    pub fn prepare(&self) -> Result<()> {
        if self.root.is_dir() {
            log::info!("Using existing graph root at {}", self.root.display());
        } else {
            log::info!("Creating graph root at {}", self.root.display());
        }
        fs::create_dir_all(self.pages_dir())?;
        fs::create_dir_all(self.journals_dir())?;
        Ok(())
    }

    /// Target path of a document
    pub fn path_for(&self, name: &str) -> PathBuf {
        let dir = if is_journal_page(name) {
            self.journals_dir()
        } else {
            self.pages_dir()
        };
        dir.join(page_file_name(name))
    }

    /// Write one document, replacing any existing file
    pub fn write_document(&self, document: &Document) -> Result<PathBuf> {
        let path = self.path_for(&document.name);
        fs::write(&path, document.to_file_contents())?;
        log::debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Prepare the graph directories and write every document
    pub fn write_all<'a>(
        &self,
        documents: impl IntoIterator<Item = &'a Document>,
    ) -> Result<WriteSummary> {
        self.prepare()?;
        let mut summary = WriteSummary {
            root: self.root.clone(),
            ..Default::default()
        };
        for document in documents {
            let path = self.write_document(document)?;
            if is_journal_page(&document.name) {
                summary.journals += 1;
            } else {
                summary.pages += 1;
            }
            summary.files.push(path);
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_journal_detection() {
        assert!(is_journal_page("2024_11_07"));
        assert!(!is_journal_page("2024-11-07"));
        assert!(!is_journal_page("2024_11_07 notes"));
        assert!(!is_journal_page("Workflowy Imports"));
    }

    #[test]
    fn test_page_file_name() {
        assert_eq!(page_file_name("Projects/Rust"), "Projects___Rust.md");
        assert_eq!(page_file_name("Plain"), "Plain.md");
    }

    #[test]
    fn test_write_all_routes_documents() {
        let temp = TempDir::new().unwrap();
        let writer = GraphWriter::new(temp.path().join("graph"));
        let documents = vec![
            Document::new("Inbox", vec!["- one".to_string(), "- two".to_string()]),
            Document::new("2024_11_07", vec!["- today".to_string()]),
            Document::new("Empty", vec![]),
        ];

        let summary = writer.write_all(&documents).unwrap();
        assert_eq!((summary.pages, summary.journals), (2, 1));
        assert_eq!(summary.total(), 3);

        let inbox = fs::read_to_string(writer.pages_dir().join("Inbox.md")).unwrap();
        assert_eq!(inbox, "- one\n- two\n");
        let journal = fs::read_to_string(writer.journals_dir().join("2024_11_07.md")).unwrap();
        assert_eq!(journal, "- today\n");
        let empty = fs::read_to_string(writer.pages_dir().join("Empty.md")).unwrap();
        assert_eq!(empty, "\n");
    }

    #[test]
    fn test_prepare_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let writer = GraphWriter::new(temp.path());
        writer.prepare().unwrap();
        writer.prepare().unwrap();
        assert!(writer.pages_dir().is_dir());
        assert!(writer.journals_dir().is_dir());
    }
}
