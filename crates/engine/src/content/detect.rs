use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::unescape::unescape;

/// Re-classification depth after unescaping.
const MAX_DETECT_DEPTH: usize = 3;

const SOAP_MARKERS: &[&str] = &["<soap:Envelope", "<SOAP-ENV:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Json,
    Xml,
    Text,
    /// Empty or non-string input
    Unknown,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Json => "json",
            ContentType::Xml => "xml",
            ContentType::Text => "text",
            ContentType::Unknown => "unknown",
        }
    }
}

/// Classify a payload as JSON, XML or text.
///
/// Payloads starting with an escaped quote or brace are unescaped and
/// classified again. A bracket-delimited payload that is not valid JSON
/// falls through to the XML and text checks.
pub fn detect_content_type(input: &str) -> ContentType {
    detect_at_depth(input, 0)
}

fn detect_at_depth(input: &str, depth: usize) -> ContentType {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return ContentType::Unknown;
    }

    if depth < MAX_DETECT_DEPTH && (trimmed.starts_with("\\\"") || trimmed.starts_with("\\{")) {
        let unescaped = unescape(trimmed);
        if unescaped != trimmed {
            return detect_at_depth(&unescaped, depth + 1);
        }
    }

    if looks_like_json(trimmed) {
        return ContentType::Json;
    }

    if looks_like_xml(trimmed) {
        return ContentType::Xml;
    }

    ContentType::Text
}

fn looks_like_json(trimmed: &str) -> bool {
    let delimited = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    delimited && serde_json::from_str::<Value>(trimmed).is_ok()
}

fn looks_like_xml(trimmed: &str) -> bool {
    if trimmed.starts_with("<?xml") {
        return true;
    }
    if SOAP_MARKERS.iter().any(|m| trimmed.contains(m)) {
        return true;
    }
    trimmed.starts_with('<') && trimmed.ends_with('>') && has_closed_tag(trimmed)
}

/// True when some `<name ...>` has a matching `</name>`.
fn has_closed_tag(s: &str) -> bool {
    let mut rest = s;
    while let Some(open) = rest.find('<') {
        let after = &rest[open + 1..];
        let name_len = after
            .char_indices()
            .find(|&(i, c)| !is_name_char(c, i == 0))
            .map(|(i, _)| i)
            .unwrap_or(after.len());

        if name_len > 0 {
            let closing = format!("</{}>", &after[..name_len]);
            if s.contains(&closing) {
                return true;
            }
        }
        rest = after;
    }
    false
}

fn is_name_char(c: char, first: bool) -> bool {
    if first {
        c.is_ascii_alphabetic() || c == '_'
    } else {
        c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_empty_is_unknown() {
        assert_eq!(detect_content_type(""), ContentType::Unknown);
        assert_eq!(detect_content_type("   \n"), ContentType::Unknown);
    }

    #[test]
    fn detect_json_object_and_array() {
        assert_eq!(detect_content_type(r#"{"a": 1}"#), ContentType::Json);
        assert_eq!(detect_content_type("  [1, 2, 3]  "), ContentType::Json);
    }

    #[test]
    fn detect_invalid_bracketed_falls_through() {
        assert_eq!(detect_content_type("{not json}"), ContentType::Text);
        assert_eq!(detect_content_type("[INFO] started"), ContentType::Text);
    }

    #[test]
    fn detect_escaped_payloads() {
        assert_eq!(detect_content_type(r#"\"[1,2]\""#), ContentType::Json);
        assert_eq!(detect_content_type(r#"\"hello\""#), ContentType::Text);
        // Single-escaped object decodes to a malformed quoted string and is left as is.
        assert_eq!(detect_content_type(r#"\"{\"a\":1}\""#), ContentType::Text);
    }

    #[test]
    fn detect_escaped_quote_unescapes_to_json() {
        // `\"` prefix unescapes to a JSON-quoted object literal on the first pass,
        // which the next pass decodes.
        let escaped = r#"\"{\\\"a\\\":1}\""#;
        assert_eq!(detect_content_type(escaped), ContentType::Json);
    }

    #[test]
    fn detect_xml_declaration() {
        assert_eq!(detect_content_type("<?xml version=\"1.0\"?><a/>"), ContentType::Xml);
    }

    #[test]
    fn detect_xml_matching_tags() {
        assert_eq!(detect_content_type("<order><id>1</id></order>"), ContentType::Xml);
        assert_eq!(detect_content_type("<ns:item attr=\"x\">v</ns:item>"), ContentType::Xml);
    }

    #[test]
    fn detect_angle_brackets_without_matching_tag() {
        assert_eq!(detect_content_type("<not> <closed>"), ContentType::Text);
        assert_eq!(detect_content_type("<br/>"), ContentType::Text);
    }

    #[test]
    fn detect_soap_marker() {
        let soap = "envelope: <soap:Envelope xmlns:soap=\"x\">";
        assert_eq!(detect_content_type(soap), ContentType::Xml);
        assert_eq!(detect_content_type("prefix <SOAP-ENV:Body>"), ContentType::Xml);
    }

    #[test]
    fn detect_plain_text() {
        assert_eq!(detect_content_type("connection refused"), ContentType::Text);
    }
}
