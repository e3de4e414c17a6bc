//! Source Parser.
//!
//! Turns the raw backup tree into normalized [`Node`]s and fills the lookup tables
//! of the [`ConversionState`] on the way:
//!
//! - every kept node is registered for cross-reference resolution and counted as a job
//! - short ids targeted by internal links or `((<id>))` references are marked so
//!   their blocks get an `id::`
//! - template definitions are registered by name, and a button sibling is inserted
//!   right after each one
//!
//! Nodes with a blank title are dropped together with their subtree, unless they
//! take part in a mirror. Children are dropped when the only child is a
//! back-reference root, or when the node is a template button with a single child.
//!
//! The walk recurses once per nesting level. Backups are parsed with `serde_json`,
//! whose recursion limit bounds the depth of any tree that reaches this module.

use crate::classify::{TEMPLATE_BUTTON_TAG, TEMPLATE_TAG, template_button_target};
use crate::text::{referenced_short_ids, strip_tag, tag_in_text};
use uuid::Uuid;
use wf2ls_core::{ConversionState, Error, LayoutMode, Node, RawNode, Result, short_id};

/// Deserialize a backup file's contents
pub fn parse_backup(json: &str) -> Result<Vec<RawNode>> {
    let nodes: Vec<RawNode> = serde_json::from_str(json)
        .map_err(|e| Error::parse_error(format!("Invalid Workflowy backup: {}", e)))?;
    log::debug!("Read {} top-level nodes from backup", nodes.len());
    Ok(nodes)
}

/// Normalize `raw` and register every kept node in `state`
pub fn parse_source(raw: &[RawNode], state: &mut ConversionState) -> Vec<Node> {
    SourceParser::new(state).parse(raw)
}

/// Walks the raw tree, filling the conversion state as it goes
pub struct SourceParser<'s> {
    state: &'s mut ConversionState,
}

impl<'s> SourceParser<'s> {
    /// Parser filling `state`
    pub fn new(state: &'s mut ConversionState) -> Self {
        Self { state }
    }

    /// Normalize a whole backup
    pub fn parse(&mut self, raw: &[RawNode]) -> Vec<Node> {
        let nodes = self.parse_level(raw);
        log::debug!(
            "Parsed {} nodes, {} templates",
            self.state.jobs.total(),
            self.state.templates.len()
        );
        nodes
    }

    fn parse_level(&mut self, raw: &[RawNode]) -> Vec<Node> {
        let mut nodes = Vec::with_capacity(raw.len());
        for raw_node in raw {
            let Some(node) = self.parse_node(raw_node) else {
                continue;
            };
            let button = self.register_template(&node);
            nodes.push(node);
            nodes.extend(button);
        }
        nodes
    }

    fn parse_node(&mut self, raw: &RawNode) -> Option<Node> {
        let title = raw.nm.trim();
        let mirror = raw.mirror_info();
        if title.is_empty() && mirror.is_none() {
            log::debug!("Dropping untitled node {}", raw.id);
            return None;
        }

        self.state.register_cross_reference(&raw.id);
        self.state.jobs.add_job();
        let note = raw.no.as_deref().map(str::trim).filter(|n| !n.is_empty());
        for short in referenced_short_ids(title).chain(note.into_iter().flat_map(referenced_short_ids)) {
            self.state.references.mark_targeted(short);
        }

        let raw_children = raw.ch.as_deref().unwrap_or_default();
        let drop_children = raw_children.len() == 1
            && (raw_children[0].metadata.is_references_root
                || template_button_target(title).is_some());
        let children = if drop_children {
            Vec::new()
        } else {
            self.parse_level(raw_children)
        };

        Some(Node {
            id: raw.id.clone(),
            title: title.to_string(),
            note: note.map(str::to_string),
            completed_at: raw.cp,
            created_at: raw.ct,
            modified_at: raw.lm,
            layout: LayoutMode::from_metadata(raw.metadata.layout_mode.as_deref()),
            mirror,
            is_references_root: raw.metadata.is_references_root,
            children,
        })
    }

    /// Register a template definition and build its button
    fn register_template(&mut self, node: &Node) -> Option<Node> {
        if !tag_in_text(TEMPLATE_TAG, &node.title) {
            return None;
        }
        let name = strip_tag(TEMPLATE_TAG, &node.title);
        let button_title = format!("{} {}:{}", name, TEMPLATE_BUTTON_TAG, short_id(&node.id));
        log::debug!("Registered template '{}'", name);
        self.state.register_template_name(&node.id, name);

        let button = Node::new(Uuid::new_v4().to_string(), button_title);
        self.state.register_cross_reference(&button.id);
        self.state.jobs.add_job();
        Some(button)
    }
}
