//! Node Classifier.
//!
//! Maps a node, together with its already-rendered title and note, to exactly one
//! [`NodeRole`]. Detection runs over [`ROLE_PRIORITY`] and the first match wins;
//! a node matching nothing is a plain [`NodeRole::Bullet`].
//!
//! Bookmark detection looks at rendered markdown rather than raw rich text so it
//! agrees with what ends up in the output.

use crate::text::{contains_link, sole_link, strip_tag, tag_in_text};
use regex::Regex;
use std::sync::LazyLock;
use wf2ls_core::{AppConfig, LayoutMode, MirrorInfo, Node};

/// Tag marking a template definition
pub const TEMPLATE_TAG: &str = "#template";

/// Tag marking a template button
pub const TEMPLATE_BUTTON_TAG: &str = "#use-template";

/// `#use-template` followed, somewhere later, by the template's short id
static TEMPLATE_BUTTON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#use-template\b.*?([0-9a-f]{12})").unwrap());

/// Short id of the template a button title points at
pub fn template_button_target(title: &str) -> Option<&str> {
    TEMPLATE_BUTTON
        .captures(title)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Semantic role of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeRole {
    /// Content carries the page-split tag
    PageSplit,
    Todo { completed_at: Option<i64> },
    Heading1,
    Heading2,
    Paragraph,
    Quote,
    CodeBlock,
    /// Title plus a single child that is only a link
    ChildBookmark { url: String },
    /// Title plus a note that is only a link
    NoteBookmark { url: String },
    MirrorRoot,
    MirrorVirtualRoot { original_id: String },
    TemplateDefinition { name: String },
    TemplateInvocation { short_id: String },
    BackReferenceRoot,
    Board,
    Bullet,
}

/// Discriminant of [`NodeRole`], used to express detection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleKind {
    PageSplit,
    Todo,
    Heading1,
    Heading2,
    Paragraph,
    Quote,
    CodeBlock,
    ChildBookmark,
    NoteBookmark,
    MirrorRoot,
    MirrorVirtualRoot,
    TemplateDefinition,
    TemplateInvocation,
    BackReferenceRoot,
    Board,
}

/// Detection order; the first kind that matches decides the role
pub const ROLE_PRIORITY: [RoleKind; 15] = [
    RoleKind::PageSplit,
    RoleKind::Todo,
    RoleKind::Heading1,
    RoleKind::Heading2,
    RoleKind::Paragraph,
    RoleKind::Quote,
    RoleKind::CodeBlock,
    RoleKind::ChildBookmark,
    RoleKind::NoteBookmark,
    RoleKind::MirrorRoot,
    RoleKind::MirrorVirtualRoot,
    RoleKind::TemplateDefinition,
    RoleKind::TemplateInvocation,
    RoleKind::BackReferenceRoot,
    RoleKind::Board,
];

/// What the classifier looks at for one node
#[derive(Debug, Clone, Copy)]
pub struct ClassifyInput<'a> {
    pub node: &'a Node,
    /// Rendered title
    pub title: &'a str,
    /// Rendered note
    pub note: Option<&'a str>,
    /// Rendered title of the node's only child, when it has exactly one
    pub only_child_title: Option<&'a str>,
}

/// Decides node roles under a given configuration
#[derive(Debug, Clone)]
pub struct Classifier {
    split_tag: String,
    compress_bookmarks: bool,
}

impl Classifier {
    /// Classifier for the configured page-split tag and bookmark compression
    pub fn new(config: &AppConfig) -> Self {
        Self {
            split_tag: config.new_page_tag.clone(),
            compress_bookmarks: config.compress_bookmarks,
        }
    }

    /// Role of a node, first match in priority order
    pub fn classify(&self, input: &ClassifyInput<'_>) -> NodeRole {
        ROLE_PRIORITY
            .iter()
            .find_map(|kind| self.detect(*kind, input))
            .unwrap_or(NodeRole::Bullet)
    }

    /// The role for `kind`, if the node qualifies for it
    pub fn detect(&self, kind: RoleKind, input: &ClassifyInput<'_>) -> Option<NodeRole> {
        let node = input.node;
        match kind {
            RoleKind::PageSplit => {
                let tagged = tag_in_text(&self.split_tag, input.title)
                    || input.note.is_some_and(|n| tag_in_text(&self.split_tag, n));
                tagged.then_some(NodeRole::PageSplit)
            }
            RoleKind::Todo => (node.layout == LayoutMode::Todo).then_some(NodeRole::Todo {
                completed_at: node.completed_at,
            }),
            RoleKind::Heading1 => (node.layout == LayoutMode::H1).then_some(NodeRole::Heading1),
            RoleKind::Heading2 => (node.layout == LayoutMode::H2).then_some(NodeRole::Heading2),
            RoleKind::Paragraph => {
                (node.layout == LayoutMode::Paragraph).then_some(NodeRole::Paragraph)
            }
            RoleKind::Quote => (node.layout == LayoutMode::Quote).then_some(NodeRole::Quote),
            RoleKind::CodeBlock => {
                (node.layout == LayoutMode::CodeBlock).then_some(NodeRole::CodeBlock)
            }
            RoleKind::ChildBookmark => self
                .child_bookmark(input)
                .map(|url| NodeRole::ChildBookmark { url }),
            RoleKind::NoteBookmark => self
                .note_bookmark(input)
                .map(|url| NodeRole::NoteBookmark { url }),
            RoleKind::MirrorRoot => match node.mirror {
                Some(MirrorInfo::Root { .. }) => Some(NodeRole::MirrorRoot),
                _ => None,
            },
            RoleKind::MirrorVirtualRoot => match &node.mirror {
                Some(MirrorInfo::VirtualRoot { original_id }) => {
                    Some(NodeRole::MirrorVirtualRoot {
                        original_id: original_id.clone(),
                    })
                }
                _ => None,
            },
            RoleKind::TemplateDefinition => tag_in_text(TEMPLATE_TAG, input.title).then(|| {
                NodeRole::TemplateDefinition {
                    name: strip_tag(TEMPLATE_TAG, input.title),
                }
            }),
            RoleKind::TemplateInvocation => {
                template_button_target(input.title).map(|short| NodeRole::TemplateInvocation {
                    short_id: short.to_string(),
                })
            }
            RoleKind::BackReferenceRoot => {
                node.is_references_root.then_some(NodeRole::BackReferenceRoot)
            }
            RoleKind::Board => (node.layout == LayoutMode::Board).then_some(NodeRole::Board),
        }
    }

    fn has_own_link(input: &ClassifyInput<'_>) -> bool {
        contains_link(input.title) || input.note.is_some_and(contains_link)
    }

    fn child_bookmark(&self, input: &ClassifyInput<'_>) -> Option<String> {
        if !self.compress_bookmarks || input.node.children.len() != 1 {
            return None;
        }
        let child = &input.node.children[0];
        if child.has_children() || child.meaningful_note().is_some() {
            return None;
        }
        if Self::has_own_link(input) {
            return None;
        }
        sole_link(input.only_child_title?).map(|link| link.url)
    }

    fn note_bookmark(&self, input: &ClassifyInput<'_>) -> Option<String> {
        if !self.compress_bookmarks || contains_link(input.title) {
            return None;
        }
        sole_link(input.note?).map(|link| link.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(compress_bookmarks: bool) -> Classifier {
        let config = AppConfig::builder()
            .compress_bookmarks(compress_bookmarks)
            .build()
            .unwrap();
        Classifier::new(&config)
    }

    fn role_of(node: &Node) -> NodeRole {
        classify_with(&classifier(true), node, None)
    }

    fn classify_with(classifier: &Classifier, node: &Node, child_title: Option<&str>) -> NodeRole {
        classifier.classify(&ClassifyInput {
            node,
            title: &node.title,
            note: node.note.as_deref(),
            only_child_title: child_title,
        })
    }

    #[test]
    fn test_priority_list_covers_every_kind_once() {
        let mut seen = std::collections::HashSet::new();
        for kind in ROLE_PRIORITY {
            assert!(seen.insert(kind));
        }
        assert_eq!(ROLE_PRIORITY[0], RoleKind::PageSplit);
        assert_eq!(ROLE_PRIORITY[1], RoleKind::Todo);
    }

    #[test]
    fn test_layout_roles() {
        let node = Node::new("n", "Title").with_layout(LayoutMode::H1);
        assert_eq!(role_of(&node), NodeRole::Heading1);

        let node = Node::new("n", "Title").with_layout(LayoutMode::Todo).completed(5);
        assert_eq!(
            role_of(&node),
            NodeRole::Todo {
                completed_at: Some(5)
            }
        );

        let node = Node::new("n", "Title").with_layout(LayoutMode::Board);
        assert_eq!(role_of(&node), NodeRole::Board);

        assert_eq!(role_of(&Node::new("n", "Title")), NodeRole::Bullet);
    }

    #[test]
    fn test_split_tag_wins_over_layout() {
        let node = Node::new("n", "Parent #LS-Page").with_layout(LayoutMode::Todo);
        assert_eq!(role_of(&node), NodeRole::PageSplit);

        let node = Node::new("n", "Parent").with_note("Move me #LS-Page");
        assert_eq!(role_of(&node), NodeRole::PageSplit);
    }

    #[test]
    fn test_child_bookmark() {
        let node = Node::new("n", "Example Site Name")
            .with_note("Some text")
            .with_children(vec![Node::new("c", "[Example](https://www.example.com/)")]);
        assert_eq!(
            classify_with(&classifier(true), &node, Some("[Example](https://www.example.com/)")),
            NodeRole::ChildBookmark {
                url: "https://www.example.com/".to_string()
            }
        );

        // Disabled by configuration
        assert_eq!(
            classify_with(&classifier(false), &node, Some("[Example](https://www.example.com/)")),
            NodeRole::Bullet
        );

        // Child title has more than the link
        assert_eq!(
            classify_with(&classifier(true), &node, Some("See [Example](https://www.example.com/)")),
            NodeRole::Bullet
        );
    }

    #[test]
    fn test_child_bookmark_requires_bare_child() {
        let with_note = Node::new("n", "Site").with_children(vec![
            Node::new("c", "[Example](https://www.example.com/)").with_note("details"),
        ]);
        assert_eq!(
            classify_with(&classifier(true), &with_note, Some("[Example](https://www.example.com/)")),
            NodeRole::Bullet
        );

        let whitespace_note = Node::new("n", "Site").with_children(vec![
            Node::new("c", "[Example](https://www.example.com/)").with_note("   "),
        ]);
        assert!(matches!(
            classify_with(&classifier(true), &whitespace_note, Some("[Example](https://www.example.com/)")),
            NodeRole::ChildBookmark { .. }
        ));

        let linked_title = Node::new("n", "[Site](https://site.example)").with_children(vec![
            Node::new("c", "[Example](https://www.example.com/)"),
        ]);
        assert_eq!(
            classify_with(&classifier(true), &linked_title, Some("[Example](https://www.example.com/)")),
            NodeRole::Bullet
        );
    }

    #[test]
    fn test_note_bookmark() {
        let node = Node::new("n", "Example").with_note("  [Example](https://www.example.com/)  ");
        assert_eq!(
            role_of(&node),
            NodeRole::NoteBookmark {
                url: "https://www.example.com/".to_string()
            }
        );

        let node = Node::new("n", "Example").with_note("Read [this](https://www.example.com/)");
        assert_eq!(role_of(&node), NodeRole::Bullet);
    }

    #[test]
    fn test_mirror_roles() {
        let root = Node::new("r", "Original").with_mirror(MirrorInfo::Root {
            virtual_root_ids: vec!["v".to_string()],
        });
        assert_eq!(role_of(&root), NodeRole::MirrorRoot);

        let virtual_root = Node::new("v", "").with_mirror(MirrorInfo::VirtualRoot {
            original_id: "r".to_string(),
        });
        assert_eq!(
            role_of(&virtual_root),
            NodeRole::MirrorVirtualRoot {
                original_id: "r".to_string()
            }
        );
    }

    #[test]
    fn test_template_roles() {
        let definition = Node::new("t", "Daily Review #template");
        assert_eq!(
            role_of(&definition),
            NodeRole::TemplateDefinition {
                name: "Daily Review".to_string()
            }
        );

        let button = Node::new("b", "Daily Review #use-template:0a1b2c3d4e5f");
        assert_eq!(
            role_of(&button),
            NodeRole::TemplateInvocation {
                short_id: "0a1b2c3d4e5f".to_string()
            }
        );

        let linked_button = Node::new("b", "#use-template [Daily](0a1b2c3d4e5f)");
        assert!(matches!(role_of(&linked_button), NodeRole::TemplateInvocation { .. }));
    }

    #[test]
    fn test_back_reference_root() {
        let mut node = Node::new("r", "Backlinks");
        node.is_references_root = true;
        assert_eq!(role_of(&node), NodeRole::BackReferenceRoot);
    }
}
