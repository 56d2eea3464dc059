use serde_json::Value;

use super::detect::{detect_content_type, ContentType};
use super::unescape::unescape;

const INDENT: &str = "  ";

/// Re-serialize JSON with indentation. Unparsable input is returned as is.
pub fn format_json(input: &str) -> String {
    serde_json::from_str::<Value>(input)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| input.to_string())
}

/// Re-indent XML one tag per line.
///
/// Closing tags dedent before they are emitted. Self-closing tags,
/// declarations, comments and elements opened and closed on the same
/// line do not nest.
pub fn format_xml(input: &str) -> String {
    let mut depth = 0usize;
    let mut lines = Vec::new();

    for part in split_tags(input.trim()) {
        if part.starts_with("</") {
            depth = depth.saturating_sub(1);
        }
        lines.push(format!("{}{}", INDENT.repeat(depth), part));
        if opens_element(part) {
            depth += 1;
        }
    }

    lines.join("\n")
}

/// Classify `input` and pretty-print it accordingly. Escaped payloads are
/// unescaped first; text is returned unchanged.
pub fn pretty_print(input: &str) -> String {
    let trimmed = input.trim();
    let candidate = if trimmed.starts_with("\\\"") || trimmed.starts_with("\\{") {
        unescape(trimmed)
    } else {
        trimmed.to_string()
    };

    match detect_content_type(&candidate) {
        ContentType::Json => format_json(&candidate),
        ContentType::Xml => format_xml(&candidate),
        ContentType::Text | ContentType::Unknown => input.to_string(),
    }
}

fn opens_element(part: &str) -> bool {
    part.starts_with('<')
        && !part.starts_with("</")
        && !part.starts_with("<?")
        && !part.starts_with("<!")
        && !part.ends_with("/>")
        && !part.contains("</")
}

/// Split on `>` `<` boundaries, dropping whitespace between them.
fn split_tags(s: &str) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'>' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j < bytes.len() && bytes[j] == b'<' {
                parts.push(&s[start..=i]);
                start = j;
                i = j;
                continue;
            }
        }
        i += 1;
    }

    if start < s.len() {
        parts.push(&s[start..]);
    }
    parts
}
