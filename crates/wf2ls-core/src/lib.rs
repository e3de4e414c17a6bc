//! # wf2ls Core
//!
//! Core data model, error type, configuration and per-run state for converting a
//! Workflowy backup into a Logseq graph. Every other crate in the workspace depends
//! on the types defined here.
//!
//! ## Core Modules
//!
//! - [`models`] - Raw backup schema ([`RawNode`]) and the normalized [`Node`]
//! - [`error`] - Error enum and `Result` alias
//! - [`config`] - [`AppConfig`], its builder and option enums
//! - [`formats`] - Date and time templates for rendered page links
//! - [`registry`] - Output documents and lookup tables ([`ConversionState`])
//! - [`progress`] - Job counting and the [`ProgressSink`] trait
//!
//! ## Usage Examples
//!
//! ```
//! use wf2ls_core::prelude::*;
//!
//! let config = AppConfig::builder()
//!     .default_page("Imports")
//!     .collapse_mode(CollapseMode::None)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.indent_spaces, 2);
//!
//! let mut state = ConversionState::new();
//! state.add_document(&config.default_page, vec!["- Hello".to_string()]);
//! assert_eq!(state.get_document("Imports").unwrap().to_file_contents(), "- Hello\n");
//! ```

#[macro_use]
mod macros;

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod progress;
pub mod registry;

pub use config::{AppConfig, AppConfigBuilder, CollapseMode, ColorMarkupMode, MarkupRules, MirrorStyle};
pub use error::{Error, Result};
pub use formats::{DateFormat, TimeFormat};
pub use models::{LayoutMode, MirrorInfo, Node, RawNode, short_id};
pub use progress::{JobCounter, ProgressSink};
pub use registry::{ConversionState, CrossReferences, Document, DocumentStore, ORPHANS_PAGE, TemplateRegistry};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{AppConfig, CollapseMode, ColorMarkupMode, MarkupRules, MirrorStyle};
    pub use crate::error::{Error, Result};
    pub use crate::formats::{DateFormat, TimeFormat};
    pub use crate::models::{LayoutMode, MirrorInfo, Node, RawNode};
    pub use crate::progress::ProgressSink;
    pub use crate::registry::{ConversionState, Document};
}
