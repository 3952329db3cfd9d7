//! Scanner for section structure.
//!
//! Two heading sources merge into one outline: `<h1>`-`<h6>` elements
//! reported by the tag scanner and `==heading==` lines. A synthetic "top"
//! section always precedes the first real heading, and each section runs
//! until the next heading at its own depth or shallower.
//!
//! Notes on the wiki markup of headings:
//! - `== 1 ===` renders as a level-2 heading titled `1 =`
//! - `=== 1 ==` renders as a level-2 heading titled `= 1`
//! - `== 1 ==x` is not a heading (trailing characters)
//! - `== 1 ==<!--x-->` is a heading (comments don't count as trailing)

use crate::base::text::clean;
use crate::parse::tags::{Tag, in_tp_tag};
use once_cell::sync::Lazy;
use regex::Regex;

/// One section of the wikitext, heading included.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Section {
    /// The title of the section (`top` for the top section). Could differ
    /// from what the wiki renders if it contains tags or templates.
    pub title: String,
    /// `==heading==` or the outer text of a heading element, trimmed.
    /// Empty for the top section.
    pub heading: String,
    /// The level of the section (1 to 6; 1 for the top section).
    pub level: usize,
    /// The ordinal position of the section (0 for the top section); matches
    /// the `section` parameter of the MediaWiki edit API.
    pub index: usize,
    /// The byte index to the start of the section in the wikitext.
    pub start_index: usize,
    /// The byte index up to, but not including, the end of the section.
    pub end_index: usize,
    /// The content of the section, heading included.
    pub content: String,
}

/// A heading occurrence from either source, before outline assembly.
struct Heading {
    text: String,
    title: String,
    level: usize,
    index: usize,
}

/// Matches `==heading==` lines.
///
/// Capture groups: `$1` left equals, `$2` heading text, `$3` right equals,
/// `$4` remaining characters.
static HEADING_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(={1,6})(.+?)(={1,6})([^\n]*)$").expect("valid regex"));

/// Whitespace that may trail a heading line without invalidating it.
static TRAILING_WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\t \u{00A0}]").expect("valid regex"));

/// Remove `<!---->` tags from a string (first occurrence each).
fn remove_comments(str: &str, tp_tags: &[Tag]) -> String {
    let mut out = str.to_string();
    for tag in tp_tags {
        if tag.name == "comment" {
            out = out.replacen(&tag.text, "", 1);
        }
    }
    out
}

/// Heading level of `h1`-`h6`, if `name` is such a tag.
fn heading_tag_level(name: &str) -> Option<usize> {
    let mut chars = name.chars();
    if chars.next() != Some('h') {
        return None;
    }
    match chars.next() {
        Some(c @ '1'..='6') if chars.next().is_none() => Some(c as usize - '0' as usize),
        _ => None,
    }
}

/// Scan the wikitext for sections.
///
/// `all_tags` is the full tag scan of the same text; `tp_tags` its
/// transclusion-preventing subset.
pub fn scan(wikitext: &str, all_tags: &[Tag], tp_tags: &[Tag]) -> Vec<Section> {
    let mut headings: Vec<Heading> = Vec::new();

    // Heading elements
    for tag in all_tags {
        if let Some(level) = heading_tag_level(&tag.name) {
            if !tag.self_closed && !in_tp_tag(tp_tags, tag.start_index, tag.end_index) {
                headings.push(Heading {
                    text: tag.text.clone(),
                    title: clean(&remove_comments(&tag.inner_text, tp_tags), true),
                    level,
                    index: tag.start_index,
                });
            }
        }
    }

    // ==heading== lines
    for caps in HEADING_LINE.captures_iter(wikitext) {
        let whole = caps.get(0).expect("whole match");
        let trailing = TRAILING_WHITESPACE.replace_all(&caps[4], "");
        // Trailing characters other than comments disqualify the line
        if (!trailing.is_empty() && !remove_comments(&trailing, tp_tags).is_empty())
            || in_tp_tag(tp_tags, whole.start(), whole.end())
        {
            continue;
        }

        let left = caps[1].len();
        let right = caps[3].len();
        let level = left.min(right);
        // Excess "="s on the longer side fold back into the title
        let title_src = format!(
            "{}{}{}",
            "=".repeat(left - level),
            &caps[2],
            "=".repeat(right - level)
        );
        headings.push(Heading {
            text: whole.as_str().trim().to_string(),
            title: clean(&remove_comments(&title_src, tp_tags), true),
            level,
            index: whole.start(),
        });
    }

    headings.sort_by_key(|h| h.index);
    headings.insert(
        0,
        Heading {
            text: String::new(),
            title: "top".to_string(),
            level: 1,
            index: 0,
        },
    );

    // Each section runs to the next heading at its own depth or shallower
    headings
        .iter()
        .enumerate()
        .map(|(i, heading)| {
            let boundary = if i == 0 {
                (headings.len() > 1).then_some(1)
            } else {
                headings
                    .iter()
                    .enumerate()
                    .skip(i + 1)
                    .find(|(_, other)| other.level <= heading.level)
                    .map(|(j, _)| j)
            };
            let end_index = boundary.map_or(wikitext.len(), |j| headings[j].index);
            Section {
                title: heading.title.clone(),
                heading: heading.text.clone(),
                level: heading.level,
                index: i,
                start_index: heading.index,
                end_index,
                content: wikitext[heading.index..end_index].to_string(),
            }
        })
        .collect()
}
