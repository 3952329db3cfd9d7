//! Foundation utilities shared by every scanner and the template model.
//!
//! - [`clean`], [`ucfirst`] - text normalization
//! - [`arrays_equal`], [`arrays_diff`] - slice comparison helpers
//! - [`TitleResolver`], [`DefaultTitleResolver`] - page-title canonicalization
//!
//! This module has NO dependencies on other crate modules.

pub mod text;
pub mod title;

pub use text::{ArraysDiff, arrays_diff, arrays_equal, clean, ucfirst};
pub use title::{DefaultTitleResolver, ResolvedTitle, TitleResolver};
