//! Data model: the raw Workflowy backup schema and the normalized outline node.
//!
//! [`RawNode`] mirrors the export file field for field. The Source Parser turns it
//! into [`Node`], which is what the converter consumes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of a Workflowy backup, exactly as exported
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    /// Name (title) as rich text
    #[serde(default)]
    pub nm: String,
    /// Note as rich text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no: Option<String>,
    /// Created, in Workflowy-epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ct: Option<i64>,
    /// Last modified, in Workflowy-epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lm: Option<i64>,
    /// Completed, in Workflowy-epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cp: Option<i64>,
    #[serde(default)]
    pub metadata: RawMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ch: Option<Vec<RawNode>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<RawMirror>,
    #[serde(default)]
    pub is_references_root: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
    #[serde(default)]
    pub is_virtual_root: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_root_ids: Option<BTreeMap<String, bool>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMirror {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror_root_ids: Option<BTreeMap<String, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
    #[serde(default)]
    pub is_mirror_root: bool,
}

impl RawNode {
    /// Mirror role declared by the metadata, if any
    pub fn mirror_info(&self) -> Option<MirrorInfo> {
        let meta = &self.metadata;
        let original = meta
            .mirror
            .as_ref()
            .and_then(|m| m.original_id.clone())
            .or_else(|| meta.original_id.clone().filter(|_| meta.is_virtual_root));
        if let Some(original_id) = original {
            return Some(MirrorInfo::VirtualRoot { original_id });
        }

        let mut virtual_root_ids: Vec<String> = meta
            .mirror
            .as_ref()
            .and_then(|m| m.mirror_root_ids.as_ref())
            .into_iter()
            .chain(meta.virtual_root_ids.as_ref())
            .flat_map(|ids| ids.iter().filter(|(_, on)| **on).map(|(id, _)| id.clone()))
            .collect();
        virtual_root_ids.sort();
        virtual_root_ids.dedup();
        if virtual_root_ids.is_empty() {
            None
        } else {
            Some(MirrorInfo::Root { virtual_root_ids })
        }
    }
}

/// Block layout chosen in Workflowy's "turn into" menu
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    #[default]
    Bullets,
    Todo,
    H1,
    H2,
    #[serde(rename = "p")]
    Paragraph,
    #[serde(rename = "quote-block")]
    Quote,
    #[serde(rename = "code-block")]
    CodeBlock,
    Board,
}

impl LayoutMode {
    /// Map a `layoutMode` value; anything unrecognized is a plain bullet
    pub fn from_metadata(layout: Option<&str>) -> Self {
        match layout {
            Some("todo") => LayoutMode::Todo,
            Some("h1") => LayoutMode::H1,
            Some("h2") => LayoutMode::H2,
            Some("p") => LayoutMode::Paragraph,
            Some("quote-block") => LayoutMode::Quote,
            Some("code-block") => LayoutMode::CodeBlock,
            Some("board") => LayoutMode::Board,
            _ => LayoutMode::Bullets,
        }
    }
}

/// Workflowy mirror role of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MirrorInfo {
    /// Canonical owner of mirrored content
    Root { virtual_root_ids: Vec<String> },
    /// Placeholder that points at its original
    VirtualRoot { original_id: String },
}

/// A normalized outline node.
///
/// Titles and notes are trimmed; a note is `None` rather than blank. An empty
/// `children` vector means the node has no children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<i64>,
    #[serde(default)]
    pub layout: LayoutMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mirror: Option<MirrorInfo>,
    #[serde(default)]
    pub is_references_root: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    /// Bullet node with no note, metadata or children
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Set the note; blank text leaves the node without one
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.trim().is_empty() {
            None
        } else {
            Some(note)
        };
        self
    }

    /// Set the layout
    pub fn with_layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }

    /// Set the children
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Set the mirror role
    pub fn with_mirror(mut self, mirror: MirrorInfo) -> Self {
        self.mirror = Some(mirror);
        self
    }

    /// Mark completed at a Workflowy timestamp
    pub fn completed(mut self, at: i64) -> Self {
        self.completed_at = Some(at);
        self
    }

    /// Whether any child survived normalization
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The note, when it has visible content
    pub fn meaningful_note(&self) -> Option<&str> {
        self.note.as_deref().filter(|n| !n.trim().is_empty())
    }
}

/// Last `-`-separated group of a node id, the twelve hex characters used in
/// Workflowy internal links
pub fn short_id(id: &str) -> &str {
    id.rsplit('-').next().unwrap_or(id)
}
