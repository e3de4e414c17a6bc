//! Tree-to-Document Converter.
//!
//! Walks the normalized tree depth first. Each node becomes one block in the page
//! being written, followed by the blocks of its children one level deeper. A node
//! carrying the page-split tag is replaced by a link block, and its content and
//! children are written to a page of their own, starting again at level 0.
//!
//! A node whose content fails to transform is logged and skipped together with its
//! subtree; its siblings and ancestors are unaffected.

use uuid::Uuid;
use wf2ls_core::formats::{workflowy_to_datetime, workflowy_to_unix_millis};
use wf2ls_core::{AppConfig, ConversionState, MirrorInfo, MirrorStyle, Node, ORPHANS_PAGE, Result};
use wf2ls_parser::html::MarkupOptions;
use wf2ls_parser::text::{
    block_prefix, indent_lines, note_prefix, plain_page_name, strip_tag, to_page_link,
};
use wf2ls_parser::{ClassifyInput, Classifier, ContentPipeline, NodeRole};

/// One rendered block before assembly
#[derive(Debug, Default)]
struct Block {
    marker: &'static str,
    title: String,
    template: Option<String>,
    id: Option<String>,
    completed_on: Option<String>,
    created_at: Option<i64>,
    updated_at: Option<i64>,
    collapsed: bool,
    note: Option<String>,
}

impl Block {
    /// Assemble in fixed order: marker, title, template properties, id, completion,
    /// metadata, collapsed flag, note
    fn render(&self, indent_spaces: usize, level: usize) -> String {
        let continuation = note_prefix(indent_spaces, level);
        let mut out = block_prefix(indent_spaces, level);
        out.push_str(self.marker);

        let mut lines = self.title.trim().split('\n');
        out.push_str(lines.next().unwrap_or_default());
        for line in lines {
            out.push('\n');
            out.push_str(&continuation);
            out.push_str(line);
        }

        if let Some(name) = &self.template {
            push_property(&mut out, &continuation, "template", name);
            push_property(&mut out, &continuation, "template-including-parent", "false");
        }
        if let Some(id) = &self.id {
            push_property(&mut out, &continuation, "id", id);
        }
        if let Some(date) = &self.completed_on {
            push_property(&mut out, &continuation, "completed-on", &to_page_link(date));
        }
        if let Some(at) = self.created_at {
            push_property(&mut out, &continuation, "created-at", &at.to_string());
        }
        if let Some(at) = self.updated_at {
            push_property(&mut out, &continuation, "updated-at", &at.to_string());
        }
        if self.collapsed {
            push_property(&mut out, &continuation, "collapsed", "true");
        }
        if let Some(note) = &self.note {
            out.push_str(&indent_lines(note, &continuation));
        }
        out
    }
}

fn push_property(out: &mut String, prefix: &str, key: &str, value: &str) {
    out.push('\n');
    out.push_str(prefix);
    out.push_str(key);
    out.push_str(":: ");
    out.push_str(value);
}

fn count_nodes(nodes: &[Node]) -> u64 {
    nodes
        .iter()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}

/// Converts a normalized tree into named documents
pub struct Converter<'s> {
    config: &'s AppConfig,
    state: &'s mut ConversionState,
    classifier: Classifier,
    options: MarkupOptions,
}

impl<'s> Converter<'s> {
    /// Converter writing into `state` with the options of `config`
    pub fn new(config: &'s AppConfig, state: &'s mut ConversionState) -> Self {
        Self {
            config,
            state,
            classifier: Classifier::new(config),
            options: MarkupOptions::from_config(config),
        }
    }

    /// Convert the whole tree, starting on the default page
    pub fn convert(&mut self, nodes: &[Node]) {
        let config = self.config;
        self.state.jobs.start();
        self.convert_page(&config.default_page, nodes);
        self.state.jobs.stop();
        log::debug!(
            "Converted {} of {} nodes into {} pages",
            self.state.jobs.completed(),
            self.state.jobs.total(),
            self.state.documents.len()
        );
    }

    /// Convert `nodes` at level 0 and write the result to `page`
    pub fn convert_page(&mut self, page: &str, nodes: &[Node]) {
        let blocks = self.convert_level(page, nodes, 0);
        self.state.documents.write_document(page, blocks);
    }

    /// Blocks for `nodes` and their descendants, with `nodes` at `level`
    pub fn convert_level(&mut self, page: &str, nodes: &[Node], level: usize) -> Vec<String> {
        let mut blocks = Vec::with_capacity(nodes.len());
        for node in nodes {
            match self.convert_node(page, node, level) {
                Ok(node_blocks) => blocks.extend(node_blocks),
                Err(e) => {
                    log::warn!(
                        "Skipping \"{}\" and its children on page \"{}\": {}",
                        node.title,
                        page,
                        e
                    );
                    self.state.jobs.complete_jobs(count_nodes(&node.children));
                }
            }
        }
        blocks
    }

    fn convert_node(&mut self, page: &str, node: &Node, level: usize) -> Result<Vec<String>> {
        self.state.jobs.complete_job();

        let pipeline = ContentPipeline::with_options(self.options, &self.state.references);
        let title = pipeline.transform(&node.title)?;
        let note = pipeline.transform_note(node.note.as_deref())?;
        let only_child_title = match node.children.as_slice() {
            [child] if self.config.compress_bookmarks => pipeline.transform(&child.title).ok(),
            _ => None,
        };

        let role = self.classifier.classify(&ClassifyInput {
            node,
            title: &title,
            note: note.as_deref(),
            only_child_title: only_child_title.as_deref(),
        });

        if role == NodeRole::PageSplit {
            return Ok(vec![self.split(node, &title, level)]);
        }
        let (title, note) = if role == NodeRole::CodeBlock {
            let verbatim = pipeline.without_mentions();
            (
                verbatim.transform(&node.title)?,
                verbatim.transform_note(node.note.as_deref())?,
            )
        } else {
            (title, note)
        };

        let (mut block, keep_children) = self.render_role(node, role, title, note);
        let children: &[Node] = if keep_children { &node.children } else { &[] };
        if !keep_children {
            self.state.jobs.complete_jobs(count_nodes(&node.children));
        }
        block.collapsed = !children.is_empty()
            && self
                .config
                .collapse_mode
                .collapses(level, self.config.collapse_depth);

        let mut blocks = vec![block.render(self.config.indent_spaces, level)];
        blocks.extend(self.convert_level(page, children, level + 1));
        Ok(blocks)
    }

    /// Apply role formatting; the flag says whether the children are still rendered
    fn render_role(
        &self,
        node: &Node,
        role: NodeRole,
        title: String,
        note: Option<String>,
    ) -> (Block, bool) {
        let mut block = Block {
            title,
            note,
            ..Default::default()
        };
        let mut keep_children = true;

        match role {
            NodeRole::Todo {
                completed_at: Some(at),
            } => {
                block.marker = "DONE ";
                block.completed_on = workflowy_to_datetime(at)
                    .map(|done| self.config.date_format.format(done.date_naive()));
                if block.completed_on.is_none() {
                    log::debug!("Completion time {} of \"{}\" is out of range", at, node.title);
                }
            }
            NodeRole::Todo { completed_at: None } => block.marker = "TODO ",
            NodeRole::Heading1 => block.marker = "# ",
            NodeRole::Heading2 => block.marker = "## ",
            NodeRole::Quote => block.marker = "> ",
            NodeRole::CodeBlock => {
                let mut body = vec![std::mem::replace(&mut block.title, "```".to_string())];
                body.extend(block.note.take());
                body.push("```".to_string());
                block.note = Some(body.join("\n"));
            }
            NodeRole::ChildBookmark { url } => {
                block.title = format!("[{}]({})", block.title, url);
                keep_children = false;
            }
            NodeRole::NoteBookmark { url } => {
                block.title = format!("[{}]({})", block.title, url);
                block.note = None;
            }
            NodeRole::MirrorVirtualRoot { original_id } => {
                block.title = match self.config.mirror_style {
                    MirrorStyle::Embed => format!("{{{{embed (({}))}}}}", original_id),
                    MirrorStyle::Reference => format!("(({}))", original_id),
                };
                keep_children = false;
            }
            NodeRole::TemplateDefinition { name } => {
                block.title = name.clone();
                block.template = Some(name);
            }
            NodeRole::TemplateInvocation { short_id } => {
                match self.state.resolve_template_name(&short_id) {
                    Some(name) => {
                        block.title = format!("{{{{renderer :template-button, {}}}}}", name)
                    }
                    None => log::warn!(
                        "No template {} for button \"{}\"",
                        short_id,
                        node.title
                    ),
                }
            }
            NodeRole::PageSplit
            | NodeRole::Paragraph
            | NodeRole::MirrorRoot
            | NodeRole::BackReferenceRoot
            | NodeRole::Board
            | NodeRole::Bullet => {}
        }

        let declares_id = matches!(node.mirror, Some(MirrorInfo::Root { .. }))
            || node.is_references_root
            || self.state.references.is_targeted(&node.id);
        if declares_id {
            block.id = Some(node.id.clone());
        }
        if self.config.include_creation_metadata {
            block.created_at = node.created_at.map(workflowy_to_unix_millis);
        }
        if self.config.include_modified_metadata {
            block.updated_at = node.modified_at.map(workflowy_to_unix_millis);
        }

        (block, keep_children)
    }

    /// Move `node` to its own page and return the link block left in its place
    fn split(&mut self, node: &Node, title: &str, level: usize) -> String {
        let config = self.config;
        let tag = &config.new_page_tag;
        let name = strip_tag(tag, &plain_page_name(title));
        let page = if name.is_empty() {
            ORPHANS_PAGE.to_string()
        } else {
            name
        };

        let mut children = Vec::with_capacity(node.children.len() + 1);
        if let Some(intro) = node.note.as_deref().map(|note| strip_tag(tag, note))
            && !intro.is_empty()
        {
            self.state.jobs.add_job();
            children.push(Node::new(Uuid::new_v4().to_string(), intro));
        }
        children.extend(node.children.iter().cloned());

        log::debug!("Splitting \"{}\" into page \"{}\"", node.title, page);
        self.convert_page(&page, &children);
        format!(
            "{}{}",
            block_prefix(config.indent_spaces, level),
            to_page_link(&page)
        )
    }
}
