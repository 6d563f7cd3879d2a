//! Turns raw bookmark responses into display HTML.
//!
//! Responses use a small inline markdown subset: bold, italic, inline code
//! and line breaks, plus at most one reference link which is pulled out of
//! the body. The output is not escaped; only the markup added here is
//! structural.

use crate::models::bookmark::{ BookmarkPayload, BookmarkRecord, FormattedBookmark };
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MARKDOWN_LINK: Regex = Regex::new(r"\[.*?\]\((.*?)\)").unwrap();
    static ref BOLD_ASTERISK: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref BOLD_UNDERSCORE: Regex = Regex::new(r"__(.*?)__").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`([^`]+?)`").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAndBody {
    pub link: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayText {
    pub link: Option<String>,
    pub html: String,
}

/// Takes the target of the first `[label](target)` as the link and strips
/// every link pattern from the body.
pub fn extract_link_and_body(raw: Option<&str>) -> LinkAndBody {
    let raw = match raw {
        Some(text) if !text.is_empty() => text,
        _ => {
            return LinkAndBody { link: None, body: String::new() };
        }
    };

    let link = MARKDOWN_LINK.captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|target| target.as_str().to_string());
    let body = MARKDOWN_LINK.replace_all(raw, "").trim().to_string();

    LinkAndBody { link, body }
}

/// Converts the inline markdown subset to HTML. Rule order matters: bold
/// runs first so the italic rule never sees doubled delimiters.
pub fn to_html(body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }

    let text = BOLD_ASTERISK.replace_all(body, "<strong>${1}</strong>");
    let text = BOLD_UNDERSCORE.replace_all(&text, "<strong>${1}</strong>");
    let text = wrap_single_delimited(&text, '*', "em");
    let text = wrap_single_delimited(&text, '_', "em");
    let text = INLINE_CODE.replace_all(&text, "<code>${1}</code>");

    text.replace('\n', "<br>")
}

pub fn format_for_display(raw: Option<&str>) -> DisplayText {
    let LinkAndBody { link, body } = extract_link_and_body(raw);
    DisplayText { link, html: to_html(&body) }
}

pub fn format_bookmark(record: &BookmarkRecord) -> FormattedBookmark {
    let DisplayText { link, html } = format_for_display(record.response.as_deref());
    let query_id = record.query_id.clone().unwrap_or_default();

    FormattedBookmark {
        id: query_id.clone(),
        query_id,
        query: record.query.clone().unwrap_or_default(),
        response_html: html,
        reference_link: link.filter(|l| !l.trim().is_empty()),
        is_bookmark: record.is_bookmark.unwrap_or(true),
    }
}

/// Formats every record in API order. Failed payloads yield nothing.
pub fn format_bookmarks(payload: &BookmarkPayload) -> Vec<FormattedBookmark> {
    if !payload.is_success() {
        return Vec::new();
    }
    payload.records().iter().map(format_bookmark).collect()
}

/// Escapes literal text placed between tags.
pub fn escape_html(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escapes a value placed inside a double-quoted attribute.
pub fn escape_attribute(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Wraps `<d>text<d>` spans in `tag`, where `text` is non-empty, contains no
/// `d`, and neither delimiter touches another `d` on its outer side.
/// Scanning resumes after each replaced span.
fn wrap_single_delimited(text: &str, delimiter: char, tag: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] == delimiter && (i == 0 || chars[i - 1] != delimiter) {
            let mut close = i + 1;
            while close < chars.len() && chars[close] != delimiter {
                close += 1;
            }
            let has_content = close > i + 1;
            let closed = close < chars.len();
            let free_after = close + 1 >= chars.len() || chars[close + 1] != delimiter;

            if has_content && closed && free_after {
                out.push('<');
                out.push_str(tag);
                out.push('>');
                out.extend(&chars[i + 1..close]);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
                i = close + 1;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }

    out
}
