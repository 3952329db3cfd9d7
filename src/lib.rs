//! # wikitext-toolkit
//!
//! Parsing and manipulation toolkit for MediaWiki-style wikitext.
//!
//! The crate parses raw page source into structured representations of
//! templates (`{{...}}`), parameters (`{{{...}}}`), tags (`<...>`), and
//! sections (`==heading==`), and renders mutated templates back into
//! wikitext. Wiki markup has no context-free grammar, so the scanners are
//! hand-rolled, position-tracking forward passes that degrade gracefully on
//! malformed input instead of failing.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! document  → Wikitext facade (source ownership, memoized scan results)
//!   ↓
//! parse     → Scanners for tags, parameters, sections, and templates
//!   ↓
//! template  → Template/ParsedTemplate model (arguments, hierarchy, rendering)
//!   ↓
//! base      → Primitives (text cleaning, title resolution, array helpers)
//! ```
//!
//! ## Quick start
//!
//! ```
//! use wikitext::Wikitext;
//!
//! let doc = Wikitext::new("{{Infobox|name=Example}}");
//! let templates = doc.parse_templates(&Default::default());
//! assert_eq!(templates[0].get_name(Default::default()), "Infobox");
//! ```
//!
//! Network transport, template expansion, and HTML rendering are out of
//! scope: callers hand this crate raw wikitext strings (optionally wrapped
//! in a [`Revision`] snapshot) and consume rendered wikitext strings.

/// Primitives: text cleaning, title resolution, array helpers
pub mod base;

/// Error types for template construction
pub mod error;

/// Scanners: tags, parameters, sections, templates
pub mod parse;

/// Template model: arguments, hierarchy resolution, rendering
pub mod template;

/// The `Wikitext` facade owning the source string and memoized scan results
mod document;

pub use document::{ParseParametersConfig, ParseTagsConfig, Revision, Wikitext};
pub use error::TemplateError;
pub use parse::{Parameter, ParseTemplatesConfig, Section, Tag};
pub use template::{
    GetArgOptions, LinebreakPredicate, NameProp, NewArg, ParsedTemplate, RenderOptions,
    ReplaceOptions, Template, TemplateArgument, TemplateConfig, Unformatted,
};

// Re-export foundation helpers
pub use base::{DefaultTitleResolver, TitleResolver, arrays_diff, arrays_equal, clean};
