pub mod catalog;
pub mod content;
pub mod id;
pub mod lint;
pub mod path;
pub mod schema;
pub mod store;
pub mod time_range;

pub use catalog::{Catalog, catalog};
pub use content::{Content, ContentMap};
pub use id::SectionKey;
pub use lint::{LintDiagnostic, LintSeverity, lint_content};
pub use path::{Path, PathStep};
pub use schema::*;
pub use time_range::{TimePart, TimeRange, TimeRangeError};
