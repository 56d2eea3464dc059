//! Payload classification, unescaping and pretty-printing for field values
//! that carry embedded JSON or XML.

pub mod detect;
pub mod pretty;
pub mod unescape;

pub use detect::{detect_content_type, ContentType};
pub use pretty::{format_json, format_xml, pretty_print};
pub use unescape::{unescape, MAX_UNESCAPE_PASSES};
