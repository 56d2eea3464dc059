//! Input shape detection: dispatch purely on content, never on filename.

use super::model::InputShape;

/// Decide how a whole file is parsed from its first non-whitespace byte.
/// - `[` → one JSON array
/// - `{` → newline-delimited JSON
/// - anything else (including empty content) → plain text lines
pub fn detect_shape(content: &str) -> InputShape {
    match content.trim_start().as_bytes().first() {
        Some(b'[') => InputShape::JsonArray,
        Some(b'{') => InputShape::Ndjson,
        _ => InputShape::PlainText,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_empty_input() {
        assert_eq!(detect_shape(""), InputShape::PlainText);
        assert_eq!(detect_shape("  \n\t"), InputShape::PlainText);
    }

    #[test]
    fn detect_json_array() {
        assert_eq!(detect_shape(r#"[{"level":"info"}]"#), InputShape::JsonArray);
        assert_eq!(detect_shape("\n\n  [\n]"), InputShape::JsonArray);
    }

    #[test]
    fn detect_ndjson() {
        let content = "{\"a\":1}\n{\"a\":2}\n";
        assert_eq!(detect_shape(content), InputShape::Ndjson);
    }

    #[test]
    fn detect_ndjson_even_when_later_lines_are_text() {
        let content = "{\"a\":1}\nplain line";
        assert_eq!(detect_shape(content), InputShape::Ndjson);
    }

    #[test]
    fn detect_plain_text() {
        assert_eq!(detect_shape("2024-01-01 INFO started"), InputShape::PlainText);
        assert_eq!(detect_shape("Rendering {{user}}"), InputShape::PlainText);
    }

    #[test]
    fn detect_bracketed_text_is_array_shape() {
        // Bracketed prefixes still dispatch to the array parser, which rejects them.
        assert_eq!(detect_shape("[INFO] started"), InputShape::JsonArray);
    }
}
