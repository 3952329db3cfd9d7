//! Scanners over raw wikitext.
//!
//! Each scanner is a single forward pass producing plain data records with
//! byte offsets into the original input:
//!
//! - [`tags`] - `<tag>` elements and `<!---->` comments, with nesting levels
//! - [`parameters`] - `{{{parameter}}}` spans, with brace-balance repair
//! - [`sections`] - `==heading==` outline structure
//! - [`templates`] - `{{template}}` occurrences as [`ParsedTemplate`]s
//!
//! Scanning is total: malformed input degrades gracefully (unclosed tags are
//! flagged, unbalanced parameters are dropped with a diagnostic) and never
//! produces an error.
//!
//! [`ParsedTemplate`]: crate::ParsedTemplate

pub mod parameters;
pub mod sections;
pub mod tags;
pub mod templates;

pub use parameters::Parameter;
pub use sections::Section;
pub use tags::{TRANSCLUSION_PREVENTING_TAGS, Tag};
pub use templates::ParseTemplatesConfig;
