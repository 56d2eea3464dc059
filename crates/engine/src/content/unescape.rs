use serde_json::Value;

/// Maximum number of unescape passes.
pub const MAX_UNESCAPE_PASSES: usize = 3;

const ESCAPES: &[&str] = &["\\\"", "\\n", "\\t", "\\r", "\\\\"];

/// Reverse string escaping, including double encoding.
///
/// Each pass either decodes a JSON-quoted string or replaces the
/// `\"`, `\n`, `\t`, `\r` and `\\` sequences. Passes stop as soon as one
/// changes nothing, and never exceed [`MAX_UNESCAPE_PASSES`]. A quoted
/// string that does not decode returns the original input.
pub fn unescape(input: &str) -> String {
    let mut current = input.to_string();

    for _ in 0..MAX_UNESCAPE_PASSES {
        let next = match unescape_pass(&current) {
            Some(next) => next,
            None => return input.to_string(),
        };
        if next == current {
            break;
        }
        current = next;
    }

    current
}

/// One pass. `None` signals a malformed quoted string.
fn unescape_pass(s: &str) -> Option<String> {
    if is_json_quoted(s) {
        return match serde_json::from_str::<Value>(s) {
            Ok(Value::String(decoded)) => Some(decoded),
            _ => None,
        };
    }

    if ESCAPES.iter().any(|e| s.contains(e)) {
        return Some(replace_escapes(s));
    }

    Some(s.to_string())
}

fn is_json_quoted(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('"') && s.ends_with('"')
}

/// Left-to-right replacement so `\\n` stays a backslash followed by `n`.
fn replace_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('"') => {
                out.push('"');
                chars.next();
            }
            Some('n') => {
                out.push('\n');
                chars.next();
            }
            Some('t') => {
                out.push('\t');
                chars.next();
            }
            Some('r') => {
                out.push('\r');
                chars.next();
            }
            Some('\\') => {
                out.push('\\');
                chars.next();
            }
            _ => out.push('\\'),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_no_escapes_is_noop() {
        assert_eq!(unescape("plain text"), "plain text");
        assert_eq!(unescape(""), "");
    }

    #[test]
    fn test_replaces_escape_sequences() {
        assert_eq!(unescape(r#"say \"hi\"\nnext\tcol"#), "say \"hi\"\nnext\tcol");
    }

    #[test]
    fn test_collapses_escaped_backslashes() {
        assert_eq!(unescape(r"C:\\data"), r"C:\data");
    }

    #[test]
    fn test_escaped_backslash_before_n_is_not_newline() {
        // One pass turns `\\n` into `\n` (backslash, n); the next pass decodes it.
        assert_eq!(replace_escapes(r"a\\nb"), r"a\nb");
    }

    #[test]
    fn test_json_quoted_string_is_decoded() {
        assert_eq!(unescape(r#""{\"a\":1}""#), r#"{"a":1}"#);
    }

    #[test]
    fn test_double_encoded_json() {
        let double = r#""{\\\"level\\\":\\\"info\\\"}""#;
        assert_eq!(unescape(double), r#"{"level":"info"}"#);
    }

    #[test]
    fn test_malformed_quoted_string_returns_input() {
        let bad = r#""broken \q escape""#;
        assert_eq!(unescape(bad), bad);
    }

    #[test]
    fn test_pass_budget_is_bounded() {
        // Four levels of escaping; only three passes are applied.
        let deep = r"\\\\\\\\n";
        let out = unescape(deep);
        assert_eq!(out, r"\n");
    }

    proptest! {
        #[test]
        fn prop_no_escape_sequences_is_noop(s in "[a-zA-Z0-9 .,:{}\\[\\]]{0,40}") {
            prop_assert_eq!(unescape(&s), s);
        }

        #[test]
        fn prop_unescape_terminates(s in "[a-z\\\\\"ntr{}]{0,40}") {
            let _ = unescape(&s);
        }
    }
}
