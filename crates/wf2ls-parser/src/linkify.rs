//! Autolinking of bare URLs, e-mail addresses and phone numbers, and `@word`
//! mention linkification.
//!
//! [`autolink`] runs on raw rich text before HTML conversion, so it only touches
//! text outside tags and outside existing anchors. [`linkify_ampersats`] runs last,
//! on rendered markdown, and only rewrites plain text.

use pulldown_cmark::{Event, Parser as MarkdownParser, Tag, TagEnd};
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;
use std::sync::LazyLock;

/// Opening or closing markup tag
static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]*>").unwrap());

static ANCHOR_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^<a[\s>]").unwrap());

static ANCHOR_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^</a\s*>").unwrap());

/// Linkable spans in plain text
static LINKABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?P<url>(?:https?://|www\.)[^\s<>\x22']+)",
        r"|(?P<email>[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,})",
        r"|(?P<phone>(?:\+?1[\-. ]?)?(?:\(\d{3}\) ?|\d{3}[\-. ])\d{3}[\-. ]\d{4})",
    ))
    .unwrap()
});

/// `@word` at the start of the text or after whitespace or an opening parenthesis
static AMPERSAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[\s(])@([A-Za-z0-9_](?:[\w.\-]*[\w])?)").unwrap()
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '\'', '"'];

/// Wrap bare URLs, e-mail addresses and phone numbers in anchors.
///
/// URLs without a scheme get `https://`.
pub fn autolink(html: &str) -> Cow<'_, str> {
    if !LINKABLE.is_match(html) {
        return Cow::Borrowed(html);
    }

    let mut out = String::with_capacity(html.len() + 32);
    let mut anchor_depth = 0usize;
    let mut cursor = 0;
    for tag in HTML_TAG.find_iter(html) {
        let text = &html[cursor..tag.start()];
        if anchor_depth == 0 {
            link_text(text, &mut out);
        } else {
            out.push_str(text);
        }

        let markup = tag.as_str();
        if ANCHOR_OPEN.is_match(markup) {
            anchor_depth += 1;
        } else if ANCHOR_CLOSE.is_match(markup) {
            anchor_depth = anchor_depth.saturating_sub(1);
        }
        out.push_str(markup);
        cursor = tag.end();
    }

    let rest = &html[cursor..];
    if anchor_depth == 0 {
        link_text(rest, &mut out);
    } else {
        out.push_str(rest);
    }
    Cow::Owned(out)
}

fn link_text(text: &str, out: &mut String) {
    let mut cursor = 0;
    for caps in LINKABLE.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let before = &text[..whole.start()];

        let anchor = if let Some(url) = caps.name("url") {
            // Already the target or the label of a markdown link
            if before.ends_with("](") || before.ends_with('[') {
                None
            } else {
                let url = trim_url(url.as_str());
                let href = if url.starts_with("www.") {
                    format!("https://{}", url)
                } else {
                    url.to_string()
                };
                Some((url.len(), format!(r#"<a href="{}">{}</a>"#, href, url)))
            }
        } else if let Some(email) = caps.name("email") {
            let email = email.as_str();
            Some((email.len(), format!(r#"<a href="mailto:{0}">{0}</a>"#, email)))
        } else if let Some(phone) = caps.name("phone") {
            let after = text[whole.end()..].chars().next();
            let glued = before
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '/'))
                || after.is_some_and(|c| c.is_alphanumeric());
            if glued {
                None
            } else {
                let phone = phone.as_str();
                let digits: String = phone
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '+')
                    .collect();
                Some((phone.len(), format!(r#"<a href="tel:{}">{}</a>"#, digits, phone)))
            }
        } else {
            None
        };

        if let Some((consumed, anchor)) = anchor {
            out.push_str(&text[cursor..whole.start()]);
            out.push_str(&anchor);
            cursor = whole.start() + consumed;
        }
    }
    out.push_str(&text[cursor..]);
}

/// Drop trailing punctuation and unbalanced closing parentheses
fn trim_url(url: &str) -> &str {
    let mut url = url;
    loop {
        let trimmed = url.trim_end_matches(TRAILING_PUNCTUATION);
        let trimmed = if trimmed.ends_with(')')
            && trimmed.matches('(').count() < trimmed.matches(')').count()
        {
            &trimmed[..trimmed.len() - 1]
        } else {
            trimmed
        };
        if trimmed.len() == url.len() {
            return url;
        }
        url = trimmed;
    }
}

/// Turn `@word` into a Logseq mention link `[[@/word]]`.
///
/// Link labels, image alt text, inline code and code blocks are left alone.
pub fn linkify_ampersats(markdown: &str) -> Cow<'_, str> {
    if !markdown.contains('@') {
        return Cow::Borrowed(markdown);
    }

    let mut out = String::with_capacity(markdown.len() + 16);
    let mut cursor = 0;
    for range in plain_text_ranges(markdown) {
        if range.start < cursor {
            continue;
        }
        for caps in AMPERSAT.captures_iter(&markdown[range.clone()]) {
            let (Some(lead), Some(word)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let start = range.start + lead.start();
            // `^` matched at the start of a text run that continues other markup
            if lead.is_empty() && !opens_word(markdown, start) {
                continue;
            }
            out.push_str(&markdown[cursor..start]);
            out.push_str(lead.as_str());
            out.push_str("[[@/");
            out.push_str(word.as_str());
            out.push_str("]]");
            cursor = range.start + word.end();
        }
    }

    if cursor == 0 {
        return Cow::Borrowed(markdown);
    }
    out.push_str(&markdown[cursor..]);
    Cow::Owned(out)
}

fn opens_word(text: &str, at: usize) -> bool {
    text[..at]
        .chars()
        .next_back()
        .is_none_or(|c| c.is_whitespace() || c == '(')
}

/// Byte ranges of text outside links, images and code, adjacent runs merged
fn plain_text_ranges(markdown: &str) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    let mut depth = 0usize;
    for (event, range) in MarkdownParser::new(markdown).into_offset_iter() {
        match event {
            Event::Start(Tag::Link { .. } | Tag::Image { .. } | Tag::CodeBlock(_)) => depth += 1,
            Event::End(TagEnd::Link | TagEnd::Image | TagEnd::CodeBlock) => {
                depth = depth.saturating_sub(1)
            }
            Event::Text(_) if depth == 0 => match ranges.last_mut() {
                Some(last) if last.end == range.start => last.end = range.end,
                _ => ranges.push(range),
            },
            _ => {}
        }
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_autolink_urls() {
        assert_eq!(
            autolink("Visit www.example.com today"),
            r#"Visit <a href="https://www.example.com">www.example.com</a> today"#
        );
        assert_eq!(
            autolink("See https://example.com/path."),
            r#"See <a href="https://example.com/path">https://example.com/path</a>."#
        );
        assert_eq!(
            autolink("(https://en.wikipedia.org/wiki/Rust_(programming_language))"),
            r#"(<a href="https://en.wikipedia.org/wiki/Rust_(programming_language)">https://en.wikipedia.org/wiki/Rust_(programming_language)</a>)"#
        );
    }

    #[test]
    fn test_autolink_skips_existing_anchors() {
        let html = r#"<a href="https://example.com">https://example.com</a>"#;
        assert_eq!(autolink(html), html);

        let markdown = "[site](https://example.com)";
        assert_eq!(autolink(markdown), markdown);
    }

    #[test]
    fn test_autolink_email_and_phone() {
        assert_eq!(
            autolink("Mail jane@example.com"),
            r#"Mail <a href="mailto:jane@example.com">jane@example.com</a>"#
        );
        assert_eq!(
            autolink("Call 555-123-4567 now"),
            r#"Call <a href="tel:5551234567">555-123-4567</a> now"#
        );
        assert_eq!(
            autolink("Call +1 (555) 123-4567"),
            r#"Call <a href="tel:+15551234567">+1 (555) 123-4567</a>"#
        );
        assert_eq!(autolink("order 12345-555-123-4567"), "order 12345-555-123-4567");
    }

    #[test]
    fn test_autolink_leaves_plain_text() {
        assert!(matches!(autolink("Nothing to see"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_ampersats() {
        assert_eq!(linkify_ampersats("@JohnDoe"), "[[@/JohnDoe]]");
        assert_eq!(linkify_ampersats("ping @jane.doe."), "ping [[@/jane.doe]].");
        assert_eq!(
            linkify_ampersats("[jane@example.com](mailto:jane@example.com)"),
            "[jane@example.com](mailto:jane@example.com)"
        );
        assert_eq!(linkify_ampersats("[[@/everyone]]"), "[[@/everyone]]");
        assert_eq!(linkify_ampersats("**@bold**"), "**@bold**");
        assert_eq!(
            linkify_ampersats("first\n@second line"),
            "first\n[[@/second]] line"
        );
    }

    #[test]
    fn test_ampersats_skip_links_and_code() {
        assert_eq!(
            linkify_ampersats("[ping @sam](https://x.com) and @jo"),
            "[ping @sam](https://x.com) and [[@/jo]]"
        );
        assert_eq!(linkify_ampersats("`npm i @scope/pkg`"), "`npm i @scope/pkg`");
        assert_eq!(
            linkify_ampersats("```\n@Override\n```"),
            "```\n@Override\n```"
        );
        assert!(matches!(linkify_ampersats("`@a` @"), Cow::Borrowed(_)));
    }
}
