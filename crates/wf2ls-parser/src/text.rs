//! Plain-text helpers shared by the pipeline, classifier and converter:
//! block prefixes, tag handling, page links and markdown link inspection.

use pulldown_cmark::{Event, Options, Parser as MarkdownParser, Tag, TagEnd};
use regex::Regex;
use std::sync::LazyLock;
use wf2ls_core::ORPHANS_PAGE;

/// Workflowy internal link: `https://workflowy.com/#/<12 hex>`
static INTERNAL_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?workflowy\.com/#/([0-9a-f]{12})\b").unwrap()
});

/// Internal link or literal `((<12 hex>))` block reference
static SHORT_ID_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?workflowy\.com/#/([0-9a-f]{12})\b|\(\(([0-9a-f]{12})\)\)").unwrap()
});

/// Prefix that opens a block at `level`
pub fn block_prefix(indent_spaces: usize, level: usize) -> String {
    format!("{}- ", " ".repeat(indent_spaces * level))
}

/// Prefix for continuation lines (notes, properties) of a block at `level`
pub fn note_prefix(indent_spaces: usize, level: usize) -> String {
    format!("{}  ", " ".repeat(indent_spaces * level))
}

/// Trim `content`, prefix every line and lead with a newline
pub fn indent_lines(content: &str, prefix: &str) -> String {
    let mut out = String::with_capacity(content.len() + prefix.len() * 4);
    for line in content.trim().split('\n') {
        out.push('\n');
        out.push_str(prefix);
        out.push_str(line.trim_end_matches('\r'));
    }
    out
}

/// Byte ranges of `tag` in `text` that are not part of a longer tag
fn tag_positions(tag: &str, text: &str) -> Vec<usize> {
    if tag.is_empty() {
        return Vec::new();
    }
    text.match_indices(tag)
        .map(|(start, _)| start)
        .filter(|start| {
            text[start + tag.len()..]
                .chars()
                .next()
                .is_none_or(|c| !(c.is_alphanumeric() || c == '-' || c == '_'))
        })
        .collect()
}

/// Whether `tag` occurs in `text` as a whole tag
pub fn tag_in_text(tag: &str, text: &str) -> bool {
    !tag_positions(tag, text).is_empty()
}

/// Remove every whole-tag occurrence of `tag`, together with one space before it
pub fn strip_tag(tag: &str, text: &str) -> String {
    let positions = tag_positions(tag, text);
    if positions.is_empty() {
        return text.trim().to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for start in positions {
        let mut cut = start;
        if cut > cursor && text[..cut].ends_with(' ') {
            cut -= 1;
        }
        out.push_str(&text[cursor..cut]);
        cursor = start + tag.len();
    }
    out.push_str(&text[cursor..]);
    out.trim().to_string()
}

/// `[[ name ]]`, or the orphans page when the name is blank
pub fn to_page_link(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        format!("[[ {} ]]", ORPHANS_PAGE)
    } else {
        format!("[[ {} ]]", name)
    }
}

/// Rendered markdown reduced to the text a page name should carry.
///
/// Emphasis, strikethrough and inline HTML markers are dropped, code spans and
/// links keep their text, and line breaks become spaces.
pub fn plain_page_name(markdown: &str) -> String {
    let mut name = String::with_capacity(markdown.len());
    for event in MarkdownParser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Text(text) | Event::Code(text) => name.push_str(&text),
            Event::SoftBreak | Event::HardBreak => name.push(' '),
            _ => {}
        }
    }
    name.trim().to_string()
}

/// Short ids referenced in raw text, by internal links or `((<id>))` block references
pub fn referenced_short_ids(text: &str) -> impl Iterator<Item = &str> {
    SHORT_ID_REFERENCE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()))
}

/// Short id of a Workflowy internal link href
pub fn internal_link_target(href: &str) -> Option<&str> {
    INTERNAL_LINK
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// A rendered markdown link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MdLink {
    pub text: String,
    pub url: String,
}

/// Whether rendered markdown contains any link
pub fn contains_link(markdown: &str) -> bool {
    MarkdownParser::new(markdown).any(|event| matches!(event, Event::Start(Tag::Link { .. })))
}

/// The link, when `markdown` consists of exactly one link and nothing else
pub fn sole_link(markdown: &str) -> Option<MdLink> {
    let trimmed = markdown.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut events = MarkdownParser::new(trimmed);
    if !matches!(events.next(), Some(Event::Start(Tag::Paragraph))) {
        return None;
    }
    let url = match events.next() {
        Some(Event::Start(Tag::Link { dest_url, .. })) => dest_url.to_string(),
        _ => return None,
    };

    let mut text = String::new();
    let mut closed = false;
    for event in events.by_ref() {
        match event {
            Event::Start(Tag::Link { .. }) => return None,
            Event::End(TagEnd::Link) => {
                closed = true;
                break;
            }
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            _ => {}
        }
    }
    if !closed {
        return None;
    }

    match (events.next(), events.next()) {
        (Some(Event::End(TagEnd::Paragraph)), None) => Some(MdLink { text, url }),
        _ => None,
    }
}
