use grep_matcher::Matcher;

use super::engine::build_matcher;
use super::query::SearchQuery;

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML-escape `text` and wrap every match of the query in `<mark>`.
///
/// Matching runs against the raw text and each segment is escaped as it
/// is emitted, so a query never lands inside an entity. An empty query or
/// a malformed regex leaves the escaped text unmarked.
pub fn highlight(text: &str, query: &str, use_regex: bool, case_sensitive: bool) -> String {
    let query = query.trim();
    if query.is_empty() {
        return escape_html(text);
    }
    let matcher = match build_matcher(query, use_regex, case_sensitive) {
        Ok(m) => m,
        Err(_) => return escape_html(text),
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let result = matcher.find_iter(text.as_bytes(), |m| {
        if m.is_empty() {
            return true;
        }
        if let (Some(before), Some(hit)) = (text.get(last..m.start()), text.get(m.start()..m.end())) {
            out.push_str(&escape_html(before));
            out.push_str(MARK_OPEN);
            out.push_str(&escape_html(hit));
            out.push_str(MARK_CLOSE);
            last = m.end();
        }
        true
    });

    if result.is_err() {
        return escape_html(text);
    }
    out.push_str(&escape_html(&text[last..]));
    out
}

/// [`highlight`] with the query's own text and modes.
pub fn highlight_query(text: &str, query: &SearchQuery) -> String {
    highlight(text, &query.text, query.use_regex, query.case_sensitive)
}
