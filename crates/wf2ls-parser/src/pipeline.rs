//! Content Transform Pipeline.
//!
//! Applied to a node's title and note, in this order:
//!
//! 1. [`autolink`](crate::linkify::autolink) bare URLs, e-mail addresses and phone numbers
//! 2. [`to_markdown`](crate::html::to_markdown) with the Workflowy-specific rules
//! 3. [`resolve_short_ids`](crate::references::resolve_short_ids) against the cross-references
//! 4. [`linkify_ampersats`](crate::linkify::linkify_ampersats) on the rendered text,
//!    unless the pipeline was built [`without_mentions`](ContentPipeline::without_mentions)
//!
//! Short ids only exist after step 2, and the cross-reference table is complete
//! only once the Source Parser has walked the whole tree, so resolution must
//! come after conversion.

use crate::html::{MarkupOptions, to_markdown};
use crate::linkify::{autolink, linkify_ampersats};
use crate::references::resolve_short_ids;
use wf2ls_core::{AppConfig, CrossReferences, Result};

/// Transforms rich text into Logseq markdown
#[derive(Debug, Clone, Copy)]
pub struct ContentPipeline<'a> {
    options: MarkupOptions,
    references: &'a CrossReferences,
    mentions: bool,
}

impl<'a> ContentPipeline<'a> {
    /// Pipeline with the markup options of `config`
    pub fn new(config: &AppConfig, references: &'a CrossReferences) -> Self {
        Self::with_options(MarkupOptions::from_config(config), references)
    }

    /// Pipeline with explicit markup options
    pub fn with_options(options: MarkupOptions, references: &'a CrossReferences) -> Self {
        Self {
            options,
            references,
            mentions: true,
        }
    }

    /// Same pipeline, leaving `@word` as written (code content)
    pub fn without_mentions(self) -> Self {
        Self {
            mentions: false,
            ..self
        }
    }

    /// Run all four steps on one piece of text
    pub fn transform(&self, text: &str) -> Result<String> {
        let linked = autolink(text);
        let markdown = to_markdown(&linked, &self.options)?;
        let resolved = resolve_short_ids(&markdown, self.references);
        if !self.mentions {
            return Ok(resolved.into_owned());
        }
        Ok(linkify_ampersats(&resolved).into_owned())
    }

    /// Transform an optional note; a note that renders blank becomes `None`
    pub fn transform_note(&self, note: Option<&str>) -> Result<Option<String>> {
        match note {
            Some(note) => {
                let rendered = self.transform(note)?;
                Ok(if rendered.trim().is_empty() {
                    None
                } else {
                    Some(rendered)
                })
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn references() -> CrossReferences {
        let mut refs = CrossReferences::default();
        refs.register("aff57398-663f-bad1-09fb-982e8186ff23");
        refs
    }

    #[test]
    fn test_full_pipeline() {
        let refs = references();
        let pipeline = ContentPipeline::new(&AppConfig::default(), &refs);

        assert_eq!(pipeline.transform("Plain title").unwrap(), "Plain title");
        assert_eq!(
            pipeline.transform("Ask @jane about www.example.com").unwrap(),
            "Ask [[@/jane]] about [www.example.com](https://www.example.com)"
        );
        assert_eq!(
            pipeline
                .transform(r#"See <a href="https://workflowy.com/#/982e8186ff23"></a>"#)
                .unwrap(),
            "See ((aff57398-663f-bad1-09fb-982e8186ff23))"
        );
    }

    #[test]
    fn test_mentions_outside_links_and_code_only() {
        let refs = CrossReferences::default();
        let pipeline = ContentPipeline::new(&AppConfig::default(), &refs);
        assert_eq!(
            pipeline
                .transform(r#"<a href="https://x.com">ping @sam</a>"#)
                .unwrap(),
            "[ping @sam](https://x.com)"
        );
        assert_eq!(
            pipeline.transform("<code>npm i @scope/pkg</code>").unwrap(),
            "`npm i @scope/pkg`"
        );
        assert_eq!(
            pipeline.without_mentions().transform("@Override").unwrap(),
            "@Override"
        );
    }

    #[test]
    fn test_email_is_not_a_mention() {
        let refs = CrossReferences::default();
        let pipeline = ContentPipeline::new(&AppConfig::default(), &refs);
        assert_eq!(
            pipeline.transform("jane@example.com").unwrap(),
            "[jane@example.com](mailto:jane@example.com)"
        );
    }

    #[test]
    fn test_blank_note_becomes_none() {
        let refs = CrossReferences::default();
        let pipeline = ContentPipeline::new(&AppConfig::default(), &refs);
        assert_eq!(pipeline.transform_note(Some("<b></b>")).unwrap(), None);
        assert_eq!(pipeline.transform_note(None).unwrap(), None);
        assert_eq!(
            pipeline.transform_note(Some("<i>x</i>")).unwrap(),
            Some("_x_".to_string())
        );
    }
}
