//! Short-id resolution for rendered block references and styled links.

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use wf2ls_core::CrossReferences;

/// `((<12 hex>))`
static BLOCK_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\(([0-9a-f]{12})\)\)").unwrap());

/// `](<12 hex>)`, the target half of a styled link
static LINK_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\(([0-9a-f]{12})\)").unwrap());

/// Replace short ids with full ids. Unknown short ids are left as they are.
pub fn resolve_short_ids<'t>(markdown: &'t str, references: &CrossReferences) -> Cow<'t, str> {
    let lookup = |short: &str| -> Option<String> {
        let full = references.resolve(short).map(str::to_string);
        if full.is_none() {
            log::debug!("No node found for short id {}", short);
        }
        full
    };

    let with_refs = BLOCK_REF.replace_all(markdown, |caps: &Captures| match lookup(&caps[1]) {
        Some(full) => format!("(({}))", full),
        None => caps[0].to_string(),
    });

    if !LINK_TARGET.is_match(&with_refs) {
        return with_refs;
    }
    let resolved = LINK_TARGET.replace_all(&with_refs, |caps: &Captures| match lookup(&caps[1]) {
        Some(full) => format!("]({})", full),
        None => caps[0].to_string(),
    });
    Cow::Owned(resolved.into_owned())
}
