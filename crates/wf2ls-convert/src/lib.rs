//! # wf2ls Convert
//!
//! The Tree-to-Document Converter: turns a normalized Workflowy tree into named
//! Logseq pages held in a [`ConversionState`].
//!
//! ```
//! use wf2ls_convert::convert_tree;
//! use wf2ls_core::prelude::*;
//!
//! let config = AppConfig::default();
//! let mut state = ConversionState::new();
//! let nodes = vec![Node::new("a", "Parent #LS-Page").with_children(vec![Node::new("b", "Child")])];
//!
//! convert_tree(&config, &mut state, &nodes);
//! assert_eq!(state.get_document("Workflowy Imports").unwrap().text(), "- [[ Parent ]]");
//! assert_eq!(state.get_document("Parent").unwrap().text(), "- Child");
//! ```

pub mod engine;

pub use engine::Converter;

use wf2ls_core::{AppConfig, ConversionState, Node};

/// Convert `nodes` into the default page and any pages split off from it
pub fn convert_tree(config: &AppConfig, state: &mut ConversionState, nodes: &[Node]) {
    Converter::new(config, state).convert(nodes);
}
