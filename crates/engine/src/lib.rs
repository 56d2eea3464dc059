// Domain-driven module structure for the loglens engine.

// Core pipeline
pub mod content;
pub mod parser;
pub mod filter;
pub mod analytics;

// Collaborators
pub mod export;
pub mod store;
pub mod session;

pub use analytics::{analyze, AnalyticsReport};
pub use content::{detect_content_type, unescape, ContentType};
pub use filter::{FilterEngine, FilterError, FilterOperator, SearchFilter, SearchQuery, TimeRange};
pub use parser::{normalize, LoadError, LogRecord, Normalizer};
pub use session::{is_supported_file, LogSession};
