//! Error types for template construction.
//!
//! Scanning itself never fails: malformed wikitext produces best-effort
//! results, with recovered conditions reported through `tracing`. The only
//! fallible operation is building a [`Template`](crate::Template) from
//! caller-supplied parts.

use thiserror::Error;

/// Errors raised by [`Template`](crate::Template) construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The template name contains an inline line break.
    #[error("name {0:?} is not allowed to contain inline line breaks")]
    NameWithLineBreak(String),

    /// The supplied full name does not contain the name as a substring.
    #[error("full name {full_name:?} does not contain name {name:?} as a substring")]
    FullNameMismatch { name: String, full_name: String },
}
