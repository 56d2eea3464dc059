pub mod engine;
pub mod highlight;
pub mod query;

pub use engine::{apply, build_matcher, FilterEngine, FilterError};
pub use highlight::{escape_html, highlight, highlight_query};
pub use query::{FilterOperator, FilterParseError, SearchFilter, SearchQuery, TimeRange};
