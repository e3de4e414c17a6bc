//! Document/State Registry.
//!
//! One [`ConversionState`] is created per run. It owns the growing set of output
//! documents, the template and cross-reference lookup tables, and the job counter.
//! Lookups never fail: a missing key yields `None`.

use crate::models::short_id;
use crate::progress::JobCounter;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Page name used when a split tag leaves no name behind
pub const ORPHANS_PAGE: &str = "Orphans";

/// One output page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    pub name: String,
    pub blocks: Vec<String>,
}

impl Document {
    /// Document named `name` holding `blocks`
    pub fn new(name: impl Into<String>, blocks: Vec<String>) -> Self {
        Self {
            name: name.into(),
            blocks,
        }
    }

    /// Blocks joined by newlines
    pub fn text(&self) -> String {
        self.blocks.join("\n")
    }

    /// File contents: the text followed by exactly one newline
    pub fn to_file_contents(&self) -> String {
        let mut contents = self.text().trim_end_matches('\n').to_string();
        contents.push('\n');
        contents
    }
}

/// Named output documents, kept in name order
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: BTreeMap<String, Document>,
}

impl DocumentStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a document
    pub fn add_document(&mut self, name: &str, blocks: Vec<String>) {
        self.documents
            .insert(name.to_string(), Document::new(name, blocks));
    }

    /// Append text as a new block; returns false when the document does not exist
    pub fn append_to_document(&mut self, name: &str, text: impl Into<String>) -> bool {
        match self.documents.get_mut(name) {
            Some(doc) => {
                doc.blocks.push(text.into());
                true
            }
            None => false,
        }
    }

    /// Create a document, or append to it when the name is already taken
    pub fn write_document(&mut self, name: &str, blocks: Vec<String>) {
        match self.documents.get_mut(name) {
            Some(doc) => {
                log::debug!("Appending {} blocks to existing page '{}'", blocks.len(), name);
                doc.blocks.extend(blocks);
            }
            None => self.add_document(name, blocks),
        }
    }

    /// Document by exact name
    pub fn get_document(&self, name: &str) -> Option<&Document> {
        self.documents.get(name)
    }

    /// Every document, in name order
    pub fn all_documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Every document whose name is not in `names`, in name order
    pub fn all_documents_except(&self, names: &[&str]) -> Vec<&Document> {
        self.documents
            .values()
            .filter(|doc| !names.contains(&doc.name.as_str()))
            .collect()
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Consume the store, returning documents in name order
    pub fn into_documents(self) -> Vec<Document> {
        self.documents.into_values().collect()
    }
}

/// Short id → template name
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    names: HashMap<String, String>,
}

impl TemplateRegistry {
    /// Register the template defined by node `node_id` under its short id
    pub fn register(&mut self, node_id: &str, name: impl Into<String>) {
        self.names.insert(short_id(node_id).to_string(), name.into());
    }

    /// Template name for the short id of its definition node
    pub fn resolve(&self, short: &str) -> Option<&str> {
        self.names.get(short).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Short id → full id, plus the set of short ids some content links to
#[derive(Debug, Clone, Default)]
pub struct CrossReferences {
    ids: HashMap<String, String>,
    targeted: HashSet<String>,
}

impl CrossReferences {
    /// Register a full node id under its short id
    pub fn register(&mut self, node_id: &str) {
        self.ids
            .insert(short_id(node_id).to_string(), node_id.to_string());
    }

    /// Full id for a short id
    pub fn resolve(&self, short: &str) -> Option<&str> {
        self.ids.get(short).map(String::as_str)
    }

    /// Record that content links to `short`
    pub fn mark_targeted(&mut self, short: &str) {
        self.targeted.insert(short.to_string());
    }

    /// Whether some content links to the node with this full id
    pub fn is_targeted(&self, node_id: &str) -> bool {
        let short = short_id(node_id);
        self.targeted.contains(short) && self.resolve(short) == Some(node_id)
    }

    /// Number of registered ids
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Everything a conversion run accumulates
#[derive(Debug, Default)]
pub struct ConversionState {
    pub documents: DocumentStore,
    pub templates: TemplateRegistry,
    pub references: CrossReferences,
    pub jobs: JobCounter,
}

impl ConversionState {
    /// Fresh state with empty tables and no progress sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a document
    pub fn add_document(&mut self, name: &str, blocks: Vec<String>) {
        self.documents.add_document(name, blocks);
    }

    /// Append a block to an existing document; false when it does not exist
    pub fn append_to_document(&mut self, name: &str, text: impl Into<String>) -> bool {
        self.documents.append_to_document(name, text)
    }

    /// Document by exact name
    pub fn get_document(&self, name: &str) -> Option<&Document> {
        self.documents.get_document(name)
    }

    /// Register a node for short-id resolution
    pub fn register_cross_reference(&mut self, node_id: &str) {
        self.references.register(node_id);
    }

    /// Full id for a short id, when some node registered it
    pub fn resolve_cross_reference(&self, short: &str) -> Option<&str> {
        self.references.resolve(short)
    }

    /// Register a template definition by name
    pub fn register_template_name(&mut self, node_id: &str, name: impl Into<String>) {
        self.templates.register(node_id, name);
    }

    /// Template name for a `#use-template` short id
    pub fn resolve_template_name(&self, short: &str) -> Option<&str> {
        self.templates.resolve(short)
    }

    /// Consume the state, keeping only the documents
    pub fn into_documents(self) -> Vec<Document> {
        self.documents.into_documents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_get_document() {
        let mut state = ConversionState::new();
        state.add_document("Page", vec!["- one".into(), "- two".into()]);
        let doc = state.get_document("Page").unwrap();
        assert_eq!(doc.text(), "- one\n- two");
        assert_eq!(doc.to_file_contents(), "- one\n- two\n");
        assert!(state.get_document("Missing").is_none());
    }

    #[test]
    fn test_empty_document_file_contents() {
        let doc = Document::new("Empty", vec![]);
        assert_eq!(doc.to_file_contents(), "\n");
    }

    #[test]
    fn test_append_is_noop_when_absent() {
        let mut docs = DocumentStore::new();
        assert!(!docs.append_to_document("Nope", "- text"));
        assert!(docs.is_empty());

        docs.add_document("Yes", vec![]);
        assert!(docs.append_to_document("Yes", "- text"));
        assert_eq!(docs.get_document("Yes").unwrap().blocks, vec!["- text"]);
    }

    #[test]
    fn test_write_accumulates_on_collision() {
        let mut docs = DocumentStore::new();
        docs.write_document(ORPHANS_PAGE, vec!["- first".into()]);
        docs.write_document(ORPHANS_PAGE, vec!["- second".into()]);
        assert_eq!(docs.get_document(ORPHANS_PAGE).unwrap().text(), "- first\n- second");

        docs.add_document(ORPHANS_PAGE, vec!["- replaced".into()]);
        assert_eq!(docs.get_document(ORPHANS_PAGE).unwrap().text(), "- replaced");
    }

    #[test]
    fn test_all_documents_except() {
        let mut docs = DocumentStore::new();
        docs.add_document("a", vec![]);
        docs.add_document("b", vec![]);
        docs.add_document("c", vec![]);
        let names: Vec<_> = docs
            .all_documents_except(&["b"])
            .into_iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(docs.all_documents().count(), 3);
    }

    #[test]
    fn test_cross_references() {
        let mut refs = CrossReferences::default();
        refs.register("aff57398-663f-bad1-09fb-982e8186ff23");
        refs.register("711e639d-9e77-4c17-8589-be91492efb04");

        assert_eq!(
            refs.resolve("982e8186ff23"),
            Some("aff57398-663f-bad1-09fb-982e8186ff23")
        );
        assert_eq!(refs.resolve("000000000000"), None);

        refs.mark_targeted("be91492efb04");
        assert!(refs.is_targeted("711e639d-9e77-4c17-8589-be91492efb04"));
        assert!(!refs.is_targeted("aff57398-663f-bad1-09fb-982e8186ff23"));
    }

    #[test]
    fn test_templates() {
        let mut state = ConversionState::new();
        state.register_template_name("5d4f0a2e-1111-2222-3333-0a1b2c3d4e5f", "Daily Review");
        assert_eq!(state.resolve_template_name("0a1b2c3d4e5f"), Some("Daily Review"));
        assert_eq!(state.resolve_template_name("ffffffffffff"), None);
    }
}
