//! Templates parsed out of a wikitext document.
//!
//! A [`ParsedTemplate`] is a [`Template`] plus its provenance: the original
//! text, the byte span it was parsed from, and its nest level. It derefs to
//! `Template`, so the whole mutation and rendering API applies; on top of
//! that it can splice a re-rendered version back into the source document
//! with [`replace_in`](ParsedTemplate::replace_in).

use std::ops::{Deref, DerefMut};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TemplateError;
use crate::template::argument::NewArg;
use crate::template::model::{RenderOptions, Template, TemplateConfig};

/// A raw argument slot accumulated by the template scanner.
///
/// `name` carries a direct parsing result: for non-first slots it keeps its
/// leading pipe, because the scanner would otherwise misread an unnamed
/// argument whose value starts with `=` (e.g. `{{T|=}}`).
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedArgument {
    /// The whole text of the slot (e.g. `|1=value`).
    pub(crate) text: String,
    /// The name part, or empty if the slot is unnamed.
    pub(crate) name: String,
    /// The value part.
    pub(crate) value: String,
}

/// Everything the scanner knows about one `{{template}}` occurrence.
pub(crate) struct ParsedTemplateParam {
    pub(crate) name: String,
    pub(crate) full_name: String,
    pub(crate) args: Vec<ParsedArgument>,
    pub(crate) text: String,
    pub(crate) start_index: usize,
    pub(crate) end_index: usize,
    pub(crate) hierarchy: Vec<Vec<String>>,
    pub(crate) nest_level: usize,
}

/// Options for [`ParsedTemplate::replace_in`].
pub struct ReplaceOptions<'a> {
    /// How to render the replacement when `with` is not given.
    pub render: RenderOptions<'a>,
    /// Replace the original template with this string instead of the
    /// rendering.
    pub with: Option<String>,
    /// If `true` (default), replacement takes place only when the passed
    /// wikitext still has the original template at the recorded byte span.
    /// This prevents an identical but nonparsed template (e.g. one inside a
    /// comment) from being wrongly replaced.
    pub use_index: bool,
}

impl Default for ReplaceOptions<'_> {
    fn default() -> Self {
        Self {
            render: RenderOptions::default(),
            with: None,
            use_index: true,
        }
    }
}

/// A line break (plus inline whitespace) at the end of the text.
static LINE_BREAK_BEFORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[^\S\n\r]*$").expect("valid regex"));

/// A line break (plus inline whitespace) at the start of the text.
static LINE_BREAK_AFTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\S\n\r]*\n[^\S\n\r]*").expect("valid regex"));

/// A template parsed out of a wikitext document, with its source span.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParsedTemplate {
    template: Template,
    original_text: String,
    start_index: usize,
    end_index: usize,
    nest_level: usize,
}

impl ParsedTemplate {
    /// Build a `ParsedTemplate` from a scanned occurrence.
    pub(crate) fn from_parsed(parsed: ParsedTemplateParam) -> Result<Self, TemplateError> {
        let mut template = Template::new(
            &parsed.name,
            TemplateConfig {
                full_name: Some(parsed.full_name),
                hierarchy: parsed.hierarchy,
            },
        )?;
        let new_args: Vec<NewArg> = parsed
            .args
            .iter()
            .map(|arg| NewArg {
                name: arg.name.strip_prefix('|').unwrap_or(&arg.name).to_string(),
                value: arg
                    .value
                    .strip_prefix('|')
                    .unwrap_or(&arg.value)
                    .to_string(),
                force_unnamed: false,
            })
            .collect();
        template.add_args(&new_args);
        Ok(Self {
            template,
            original_text: parsed.text,
            start_index: parsed.start_index,
            end_index: parsed.end_index,
            nest_level: parsed.nest_level,
        })
    }

    /// The original template text, as it appeared in the source.
    pub fn render_original(&self) -> &str {
        &self.original_text
    }

    /// The byte index to the start of the template in the source wikitext.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// The byte index up to, but not including, the end of the template in
    /// the source wikitext.
    pub fn end_index(&self) -> usize {
        self.end_index
    }

    /// The nest level of the template (`0` if not nested inside another
    /// template).
    pub fn nest_level(&self) -> usize {
        self.nest_level
    }

    /// Shift the recorded span when the template was parsed out of an inner
    /// slice of the document.
    pub(crate) fn shift(&mut self, offset: usize) {
        self.start_index += offset;
        self.end_index += offset;
    }

    /// Find the original template in `wikitext` and replace it with the
    /// (updated) rendering, returning the new wikitext. The input should be
    /// the same text the template was parsed from.
    ///
    /// When replacing several templates of one document, iterate the parsed
    /// array in reverse so that earlier spans stay valid.
    ///
    /// Replacing a template with an empty string collapses the blank line
    /// it would leave behind.
    pub fn replace_in(&self, wikitext: &str, options: &ReplaceOptions) -> String {
        let replacer = match &options.with {
            Some(text) => text.clone(),
            None => self.template.render(&options.render),
        };

        if !options.use_index {
            return wikitext.replacen(&self.original_text, &replacer, 1);
        }

        if wikitext.get(self.start_index..self.end_index) == Some(self.original_text.as_str()) {
            let mut before = wikitext[..self.start_index].to_string();
            let mut after = wikitext[self.end_index..].to_string();
            let has_line_break =
                LINE_BREAK_BEFORE.is_match(&before) || LINE_BREAK_AFTER.is_match(&after);
            if replacer.is_empty() && has_line_break {
                before = before.trim().to_string();
                after = format!(
                    "{}{}",
                    if before.is_empty() { "" } else { "\n" },
                    after.trim()
                );
            }
            format!("{before}{replacer}{after}")
        } else {
            wikitext.to_string()
        }
    }
}

impl Deref for ParsedTemplate {
    type Target = Template;

    fn deref(&self) -> &Template {
        &self.template
    }
}

impl DerefMut for ParsedTemplate {
    fn deref_mut(&mut self) -> &mut Template {
        &mut self.template
    }
}
