//! # wf2ls Parser
//!
//! Reading side of the converter: the Source Parser that normalizes a Workflowy
//! backup, the Content Transform Pipeline that renders rich text as Logseq
//! markdown, and the Node Classifier that assigns each node its role.
//!
//! ## Modules
//!
//! - [`source`] - backup deserialization and tree normalization
//! - [`pipeline`] - the four-step [`ContentPipeline`]
//! - [`html`] - rich text to markdown rendering
//! - [`linkify`] - autolinking and `@mention` links
//! - [`references`] - short-id resolution
//! - [`classify`] - [`NodeRole`] detection
//! - [`text`] - block prefixes, tags and markdown link helpers
//!
//! ## Example
//!
//! ```
//! use wf2ls_core::prelude::*;
//! use wf2ls_parser::{ContentPipeline, parse_backup, parse_source};
//!
//! let raw = parse_backup(r#"[{"id": "a-0a1b2c3d4e5f", "nm": "<b>Hello</b>"}]"#).unwrap();
//! let mut state = ConversionState::new();
//! let nodes = parse_source(&raw, &mut state);
//!
//! let config = AppConfig::default();
//! let pipeline = ContentPipeline::new(&config, &state.references);
//! assert_eq!(pipeline.transform(&nodes[0].title).unwrap(), "**Hello**");
//! ```

pub mod classify;
pub mod html;
pub mod linkify;
pub mod pipeline;
pub mod references;
pub mod source;
pub mod text;

pub use classify::{
    ClassifyInput, Classifier, NodeRole, ROLE_PRIORITY, RoleKind, TEMPLATE_BUTTON_TAG,
    TEMPLATE_TAG, template_button_target,
};
pub use html::{MarkupOptions, to_markdown};
pub use pipeline::ContentPipeline;
pub use source::{SourceParser, parse_backup, parse_source};

/// Re-export commonly used items
pub mod prelude {
    pub use crate::classify::{ClassifyInput, Classifier, NodeRole};
    pub use crate::pipeline::ContentPipeline;
    pub use crate::source::{parse_backup, parse_source};
    pub use crate::text::{block_prefix, note_prefix, to_page_link};
}
