pub mod json;
pub mod plain;

pub use json::{normalize_element, normalize_object, parse_array, parse_ndjson_line, LineOutcome};
pub use plain::parse_line;
