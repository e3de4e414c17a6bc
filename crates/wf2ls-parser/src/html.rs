//! Workflowy rich text to Logseq markdown.
//!
//! Input is parsed with html5ever into an `RcDom` and rendered element by element.
//! Besides the usual inline formatting, Workflowy-specific elements get their own
//! rules, each switchable through [`MarkupRules`]:
//!
//! - `<s>` strikethrough
//! - anchors with no visible text (bare links)
//! - internal `workflowy.com/#/<id>` anchors (block references and styled links)
//! - `<span class="colored ...">` color and highlight spans
//! - `<time>` date and time stamps
//! - `<mention>` user mentions
//!
//! Text is passed through verbatim; no markdown escaping is applied.

use crate::text::{internal_link_target, to_page_link};
use chrono::{NaiveDate, NaiveTime};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use html5ever::{Attribute, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use wf2ls_core::{AppConfig, ColorMarkupMode, DateFormat, Error, MarkupRules, Result, TimeFormat};

/// Highlight color rendered as plain `==text==`
const DEFAULT_HIGHLIGHT: &str = "yellow";

/// Everything the renderer needs from the configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkupOptions {
    pub rules: MarkupRules,
    pub color_mode: ColorMarkupMode,
    pub date_format: DateFormat,
    pub time_format: TimeFormat,
}

impl MarkupOptions {
    /// Options taken from the configuration
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            rules: config.markup_rules,
            color_mode: config.text_color_markup_mode,
            date_format: config.date_format,
            time_format: config.time_format,
        }
    }
}

/// Convert rich text to markdown.
///
/// Fails on `<time>` elements whose date attributes are missing or invalid.
pub fn to_markdown(html: &str, options: &MarkupOptions) -> Result<String> {
    if !html.contains('<') && !html.contains('&') {
        return Ok(html.to_string());
    }

    let dom = parse_fragment(html);
    let body = find_first_element(&dom.document, "body")
        .ok_or_else(|| Error::markup_error("rich text produced no body"))?;

    let renderer = Renderer { options };
    let mut out = String::with_capacity(html.len());
    renderer.children(&body, &mut out)?;
    Ok(out)
}

fn parse_fragment(html: &str) -> RcDom {
    let wrapped = format!("<!DOCTYPE html><html><head></head><body>{}</body></html>", html);
    parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .one(wrapped.as_bytes())
}

fn find_first_element(handle: &Handle, name: &str) -> Option<Handle> {
    if let NodeData::Element { name: ref qname, .. } = handle.data {
        if qname.local.as_ref() == name {
            return Some(handle.clone());
        }
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_first_element(child, name))
}

fn attr(attrs: &[Attribute], name: &str) -> Option<String> {
    attrs
        .iter()
        .find(|a| a.name.local.as_ref() == name)
        .map(|a| a.value.to_string())
}

struct Renderer<'a> {
    options: &'a MarkupOptions,
}

impl Renderer<'_> {
    fn children(&self, handle: &Handle, out: &mut String) -> Result<()> {
        for child in handle.children.borrow().iter() {
            self.node(child, out)?;
        }
        Ok(())
    }

    fn inner(&self, handle: &Handle) -> Result<String> {
        let mut inner = String::new();
        self.children(handle, &mut inner)?;
        Ok(inner)
    }

    fn node(&self, handle: &Handle, out: &mut String) -> Result<()> {
        match handle.data {
            NodeData::Text { ref contents } => {
                out.push_str(&contents.borrow());
                Ok(())
            }
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let attrs = attrs.borrow();
                self.element(name.local.as_ref(), &attrs, handle, out)
            }
            NodeData::Document => self.children(handle, out),
            _ => Ok(()),
        }
    }

    fn element(
        &self,
        name: &str,
        attrs: &[Attribute],
        handle: &Handle,
        out: &mut String,
    ) -> Result<()> {
        let rules = &self.options.rules;
        match name {
            "br" => out.push('\n'),
            "b" | "strong" => delimit(&self.inner(handle)?, "**", "**", out),
            "i" | "em" => delimit(&self.inner(handle)?, "_", "_", out),
            "code" => delimit(&self.inner(handle)?, "`", "`", out),
            "u" => delimit(&self.inner(handle)?, "<u>", "</u>", out),
            "s" | "strike" | "del" if rules.strikethrough => {
                delimit(&self.inner(handle)?, "~~", "~~", out)
            }
            "a" => self.anchor(attrs, &self.inner(handle)?, out),
            "span" => self.span(attrs, &self.inner(handle)?, out),
            "time" if rules.dates => out.push_str(&self.time(attrs)?),
            "mention" if rules.mentions => self.mention(attrs, &self.inner(handle)?, out),
            "head" | "script" | "style" => {}
            _ => self.children(handle, out)?,
        }
        Ok(())
    }

    fn anchor(&self, attrs: &[Attribute], text: &str, out: &mut String) {
        let rules = &self.options.rules;
        let href = attr(attrs, "href").unwrap_or_default();
        let label = text.trim();

        if let Some(short) = internal_link_target(&href) {
            if rules.internal_block_refs && (label.is_empty() || label == href) {
                out.push_str(&format!("(({}))", short));
                return;
            }
            if rules.internal_links && !label.is_empty() {
                out.push_str(&format!("[{}]({})", label, short));
                return;
            }
        }

        if href.is_empty() {
            out.push_str(text);
        } else if label.is_empty() && rules.bare_links {
            out.push_str(&href);
        } else {
            out.push_str(&format!("[{}]({})", label, href));
        }
    }

    fn span(&self, attrs: &[Attribute], text: &str, out: &mut String) {
        let class = attr(attrs, "class").unwrap_or_default();
        let colored = class.split_whitespace().any(|c| c == "colored");
        if !self.options.rules.colors || !colored || text.is_empty() {
            out.push_str(text);
            return;
        }

        if self.options.color_mode == ColorMarkupMode::Plugin {
            out.push_str(&format!(r#"<span class="{}">{}</span>"#, class.trim(), text));
            return;
        }

        let background = class.split_whitespace().find_map(|c| c.strip_prefix("bc-"));
        let foreground = class.split_whitespace().find_map(|c| c.strip_prefix("c-"));
        let tag = match (background, foreground) {
            (Some(DEFAULT_HIGHLIGHT), _) => String::new(),
            (Some(color), _) => format!("[[#{}]]", color),
            (None, Some(color)) => format!("[[${}]]", color),
            (None, None) => {
                out.push_str(text);
                return;
            }
        };
        out.push_str(&tag);
        delimit(text, "==", "==", out);
    }

    fn time(&self, attrs: &[Attribute]) -> Result<String> {
        let start = self.stamp(attrs, "start")?.ok_or_else(|| {
            Error::markup_error("<time> element without startYear/startMonth/startDay")
        })?;
        match self.stamp(attrs, "end")? {
            Some(end) => Ok(format!("{} to {}", start, end)),
            None => Ok(start),
        }
    }

    /// `[[ date ]]` with an optional ` at time`, from `<prefix>year` etc.
    fn stamp(&self, attrs: &[Attribute], prefix: &str) -> Result<Option<String>> {
        let part = |field: &str| attr(attrs, &format!("{}{}", prefix, field));
        let Some(year) = part("year") else {
            return Ok(None);
        };
        let year: i32 = parse_number(&year, prefix, "year")?;
        let month: u32 = parse_number(&required(part("month"), prefix, "month")?, prefix, "month")?;
        let day: u32 = parse_number(&required(part("day"), prefix, "day")?, prefix, "day")?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            Error::markup_error(format!("invalid date {}-{}-{}", year, month, day))
        })?;

        let mut rendered = to_page_link(&self.options.date_format.format(date));
        if let Some(hour) = part("hour") {
            let hour: u32 = parse_number(&hour, prefix, "hour")?;
            let minute: u32 = match part("minute") {
                Some(minute) => parse_number(&minute, prefix, "minute")?,
                None => 0,
            };
            let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| {
                Error::markup_error(format!("invalid time {}:{}", hour, minute))
            })?;
            rendered.push_str(" at ");
            rendered.push_str(&self.options.time_format.format(date.and_time(time)));
        }
        Ok(Some(rendered))
    }

    fn mention(&self, attrs: &[Attribute], text: &str, out: &mut String) {
        match attr(attrs, "id").map(|id| id.trim().to_string()) {
            Some(id) if id == "0" => out.push_str("[[@/everyone]]"),
            Some(id) if !id.is_empty() => out.push_str(&format!("[[@/{}]]", id)),
            _ => out.push_str(text.trim()),
        }
    }
}

fn required(value: Option<String>, prefix: &str, field: &str) -> Result<String> {
    value.ok_or_else(|| Error::markup_error(format!("<time> element without {}{}", prefix, field)))
}

fn parse_number<T: std::str::FromStr>(raw: &str, prefix: &str, field: &str) -> Result<T> {
    raw.trim().parse().map_err(|_| {
        Error::markup_error(format!("<time> {}{} is not a number: {:?}", prefix, field, raw))
    })
}

/// Wrap `text` in delimiters, keeping surrounding whitespace outside them
fn delimit(text: &str, open: &str, close: &str, out: &mut String) {
    let core = text.trim();
    if core.is_empty() {
        out.push_str(text);
        return;
    }
    let leading = &text[..text.len() - text.trim_start().len()];
    let trailing = &text[text.trim_end().len()..];
    out.push_str(leading);
    out.push_str(open);
    out.push_str(core);
    out.push_str(close);
    out.push_str(trailing);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(html: &str) -> String {
        to_markdown(html, &MarkupOptions::default()).unwrap()
    }

    fn md_with(html: &str, options: MarkupOptions) -> String {
        to_markdown(html, &options).unwrap()
    }

    #[test]
    fn test_plain_text_passes_through() {
        assert_eq!(md("Just text"), "Just text");
        assert_eq!(md("\nNon-html\ncontent\n"), "\nNon-html\ncontent\n");
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(md("a &lt; b &amp;&amp; c &gt; d"), "a < b && c > d");
        assert_eq!(md("&apos;quoted&quot;"), "'quoted\"");
        assert_eq!(md("Fish & chips"), "Fish & chips");
    }

    #[test]
    fn test_inline_formatting() {
        assert_eq!(md("<b>bold</b>"), "**bold**");
        assert_eq!(md("<i>italic</i>"), "_italic_");
        assert_eq!(md("<u>under</u>"), "<u>under</u>");
        assert_eq!(md("<s>gone</s>"), "~~gone~~");
        assert_eq!(md("<code>x = 1</code>"), "`x = 1`");
        assert_eq!(md("a<b> spaced </b>b"), "a **spaced** b");
        assert_eq!(md("line<br>break"), "line\nbreak");
        assert_eq!(md("<b></b>empty"), "empty");
    }

    #[test]
    fn test_newlines_around_markup() {
        assert_eq!(md("first\n<b>second</b>\nthird"), "first\n**second**\nthird");
    }

    #[test]
    fn test_links() {
        assert_eq!(
            md(r#"<a href="https://example.com">Example</a>"#),
            "[Example](https://example.com)"
        );
        assert_eq!(md(r#"<a href="https://example.com"></a>"#), "https://example.com");
        assert_eq!(md(r#"<a>no target</a>"#), "no target");
    }

    #[test]
    fn test_internal_links() {
        assert_eq!(
            md(r#"<a href="https://workflowy.com/#/982e8186ff23">Link text here</a>"#),
            "[Link text here](982e8186ff23)"
        );
        assert_eq!(
            md(r#"<a href="https://workflowy.com/#/982e8186ff23"></a>"#),
            "((982e8186ff23))"
        );
        assert_eq!(
            md(r#"<a href="https://workflowy.com/#/982e8186ff23">https://workflowy.com/#/982e8186ff23</a>"#),
            "((982e8186ff23))"
        );
    }

    #[test]
    fn test_color_spans() {
        assert_eq!(md(r#"<span class="colored bc-red">hot</span>"#), "[[#red]]==hot==");
        assert_eq!(md(r#"<span class="colored bc-yellow">note</span>"#), "==note==");
        assert_eq!(md(r#"<span class="colored c-green">go</span>"#), "[[$green]]==go==");
        assert_eq!(md(r#"<span class="c-red">no marker</span>"#), "no marker");
        assert_eq!(md(r#"<span>bare</span>"#), "bare");
    }

    #[test]
    fn test_color_spans_plugin_mode() {
        let options = MarkupOptions {
            color_mode: ColorMarkupMode::Plugin,
            ..Default::default()
        };
        assert_eq!(
            md_with(r#"<span class="colored bc-red">hot</span>"#, options),
            r#"<span class="colored bc-red">hot</span>"#
        );
        assert_eq!(md_with(r#"<span>bare</span>"#, options), "bare");
    }

    #[test]
    fn test_time_elements() {
        assert_eq!(
            md(r#"<time startYear="2024" startMonth="10" startDay="31">Thu, Oct 31, 2024</time>"#),
            "[[ 2024-10-31 ]]"
        );
        assert_eq!(
            md(r#"<time startYear="2024" startMonth="10" startDay="31" startHour="8" startMinute="53">Thu, Oct 31, 2024 at 8:53am</time>"#),
            "[[ 2024-10-31 ]] at 08:53"
        );
        assert_eq!(
            md(r#"<time startYear="2024" startMonth="10" startDay="31" startHour="0" startMinute="0">midnight</time>"#),
            "[[ 2024-10-31 ]] at 00:00"
        );
    }

    #[test]
    fn test_time_uses_configured_formats() {
        let options = MarkupOptions {
            date_format: DateFormat::ShortMonthOrdinal,
            time_format: TimeFormat::TwelveHourUpper,
            ..Default::default()
        };
        assert_eq!(
            md_with(
                r#"<time startYear="2024" startMonth="9" startDay="1" startHour="14" startMinute="5" endYear="2024" endMonth="9" endDay="3">x</time>"#,
                options
            ),
            "[[ Sep 1st, 2024 ]] at 2:05 PM to [[ Sep 3rd, 2024 ]]"
        );
    }

    #[test]
    fn test_malformed_time_is_an_error() {
        let options = MarkupOptions::default();
        let err = to_markdown(
            r#"<time startYear="2024" startMonth="13" startDay="40">bad</time>"#,
            &options,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MarkupError { .. }));

        assert!(to_markdown(r#"<time startMonth="1" startDay="2">x</time>"#, &options).is_err());
        assert!(to_markdown(r#"<time startYear="abc" startMonth="1" startDay="2">x</time>"#, &options).is_err());
    }

    #[test]
    fn test_mentions() {
        assert_eq!(md(r#"<mention id="286081" by="1" ts="2">Jane</mention>"#), "[[@/286081]]");
        assert_eq!(md(r#"<mention id="0">everyone</mention>"#), "[[@/everyone]]");
    }

    #[test]
    fn test_rules_can_be_disabled() {
        let options = MarkupOptions {
            rules: MarkupRules::none(),
            ..Default::default()
        };
        assert_eq!(md_with("<s>gone</s>", options), "gone");
        assert_eq!(
            md_with(r#"<a href="https://workflowy.com/#/982e8186ff23">text</a>"#, options),
            "[text](https://workflowy.com/#/982e8186ff23)"
        );
        assert_eq!(md_with(r#"<span class="colored bc-red">hot</span>"#, options), "hot");
        assert_eq!(
            md_with(r#"<time startYear="2024" startMonth="13" startDay="1">Oct</time>"#, options),
            "Oct"
        );
        assert_eq!(md_with(r#"<mention id="0">everyone</mention>"#, options), "everyone");
    }

    #[test]
    fn test_mixed_note() {
        let note = concat!(
            "<b>Agenda</b> for <time startYear=\"2024\" startMonth=\"11\" startDay=\"7\">Nov 7</time>\n",
            "<span class=\"colored c-green\">go</span> / <s>stop</s>\n",
            "see <a href=\"https://workflowy.com/#/982e8186ff23\">https://workflowy.com/#/982e8186ff23</a>",
        );
        insta::assert_snapshot!(md(note), @r"
        **Agenda** for [[ 2024-11-07 ]]
        [[$green]]==go== / ~~stop~~
        see ((982e8186ff23))
        ");
    }
}
