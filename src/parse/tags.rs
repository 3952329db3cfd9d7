//! Character-by-character scanner for `<tag>`s and `<!---->` comments.
//!
//! The scan walks the input one position at a time rather than jumping
//! between global regex matches, because comment state must suppress all
//! other tag recognition: inside `<!-- ... -->` nothing but the closing
//! `-->` is meaningful.

use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;

/// One `<tag>` (or comment) occurrence in the wikitext.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tag {
    /// The name of the tag in lowercase (`comment` for a `<!---->` tag).
    pub name: SmolStr,
    /// The whole text of the tag (i.e. outerHTML).
    pub text: String,
    /// The text inside the tag (i.e. innerHTML).
    pub inner_text: String,
    /// Whether the tag closes itself. For comments, `true` for empty ones
    /// (i.e. `<!---->`).
    pub self_closed: bool,
    /// Whether the tag is left unclosed.
    pub unclosed: bool,
    /// The byte index to the start of the tag in the wikitext.
    pub start_index: usize,
    /// The byte index up to, but not including, the end of the tag.
    pub end_index: usize,
    /// The nest level of the tag (`0` if not inside any parent tag).
    pub nest_level: usize,
}

/// Tags whose contents are never interpreted as template, parameter, or
/// link syntax.
pub const TRANSCLUSION_PREVENTING_TAGS: [&str; 6] =
    ["comment", "nowiki", "pre", "syntaxhighlight", "source", "math"];

/// Whether `name` is one of the transclusion-preventing tags.
pub fn is_transclusion_preventing(name: &str) -> bool {
    TRANSCLUSION_PREVENTING_TAGS.contains(&name)
}

/// Whether the span `[start_index, end_index)` lies strictly inside any of
/// the given transclusion-preventing tags.
pub(crate) fn in_tp_tag(tp_tags: &[Tag], start_index: usize, end_index: usize) -> bool {
    tp_tags
        .iter()
        .any(|tag| tag.start_index < start_index && end_index < tag.end_index)
}

/// Matches `<tag>`; no whitespace between `<` and the tag name, and the
/// name cannot begin with `/`. (`$1`: tag name)
static OPENING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<([^>\s/][^>\s]*)(?:\s[^>]*)?>").expect("valid regex"));

/// Matches `</tag>`. (`$1`: tag name)
static CLOSING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^</([^>\s]+)(?:\s[^>]*)?>").expect("valid regex"));

/// An entry on the open-tag stack.
struct OpenTag {
    name: SmolStr,
    start_index: usize,
    inner_start_index: usize,
}

/// Scan the wikitext for tags, one character position at a time.
///
/// Behavior on malformed input:
/// - A closing tag pops the stack down to the first entry with a matching
///   name; intermediate entries are emitted with `unclosed: true`, ending
///   just before the unrelated closing tag.
/// - A closing tag with no matching open entry flushes the whole stack as
///   unclosed.
/// - Anything still open at end of input is emitted as unclosed, spanning
///   to the end of the string.
///
/// The result is sorted so that a tag containing another precedes it
/// (ascending start index, descending end index).
pub fn scan(wikitext: &str) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    let mut parsing: Vec<OpenTag> = Vec::new();
    let len = wikitext.len();

    let mut i = 0;
    while i < len {
        let rest = &wikitext[i..];
        let in_comment = parsing.last().is_some_and(|open| open.name == "comment");

        if in_comment {
            if rest.starts_with("-->") {
                let open = parsing.pop().expect("comment entry on stack");
                let end_index = i + 3;
                tags.push(Tag {
                    name: open.name,
                    text: wikitext[open.start_index..end_index].to_string(),
                    inner_text: wikitext[open.inner_start_index..i].to_string(),
                    // <!--|-->: the pipe is where the current index is at
                    self_closed: open.start_index + 4 == i,
                    unclosed: false,
                    start_index: open.start_index,
                    end_index,
                    nest_level: parsing.len(),
                });
                i += 3;
            } else {
                i += char_len_at(wikitext, i);
            }
            continue;
        }

        if rest.starts_with("<!--") {
            parsing.push(OpenTag {
                name: SmolStr::new_static("comment"),
                start_index: i,
                inner_start_index: i + 4,
            });
            i += 4;
            continue;
        }

        if let Some(caps) = OPENING.captures(rest) {
            let whole = caps.get(0).expect("whole match").as_str();
            let self_closed = whole.ends_with("/>");
            let raw_name = caps.get(1).expect("tag name").as_str();
            // <br/> captures "br/"; the slash is not part of the name
            let name = SmolStr::new(
                if self_closed {
                    raw_name.trim_end_matches('/')
                } else {
                    raw_name
                }
                .to_lowercase(),
            );
            if self_closed {
                tags.push(Tag {
                    name,
                    text: whole.to_string(),
                    inner_text: String::new(),
                    self_closed: true,
                    unclosed: false,
                    start_index: i,
                    end_index: i + whole.len(),
                    nest_level: parsing.len(),
                });
            } else {
                parsing.push(OpenTag {
                    name,
                    start_index: i,
                    inner_start_index: i + whole.len(),
                });
            }
            i += whole.len();
            continue;
        }

        if !parsing.is_empty() {
            if let Some(caps) = CLOSING.captures(rest) {
                let whole = caps.get(0).expect("whole match").as_str();
                let closing_name = caps.get(1).expect("tag name").as_str().to_lowercase();
                let mut popped = 0;
                for (depth, open) in parsing.iter().enumerate().rev() {
                    let matched = open.name == closing_name;
                    // <span></span>, or <span><div>|</span> for the unclosed <div>
                    let end_index = if matched { i + whole.len() } else { i };
                    let inner_end = if matched { i } else { end_index };
                    tags.push(Tag {
                        name: open.name.clone(),
                        text: wikitext[open.start_index..end_index].to_string(),
                        inner_text: wikitext[open.inner_start_index..inner_end].to_string(),
                        self_closed: false,
                        unclosed: !matched,
                        start_index: open.start_index,
                        end_index,
                        nest_level: depth,
                    });
                    popped += 1;
                    if matched {
                        break;
                    }
                }
                parsing.truncate(parsing.len() - popped);
                i += whole.len();
                continue;
            }
        }

        i += char_len_at(wikitext, i);
    }

    // Anything still open runs to the end of the input
    for (depth, open) in parsing.iter().enumerate() {
        tags.push(Tag {
            name: open.name.clone(),
            text: wikitext[open.start_index..].to_string(),
            inner_text: wikitext[open.inner_start_index..].to_string(),
            self_closed: false,
            unclosed: true,
            start_index: open.start_index,
            end_index: len,
            nest_level: depth,
        });
    }

    // A tag fully containing another must precede it
    tags.sort_by(|a, b| {
        a.start_index
            .cmp(&b.start_index)
            .then_with(|| b.end_index.cmp(&a.end_index))
    });

    tags
}

/// Length in bytes of the character starting at `i`.
pub(crate) fn char_len_at(text: &str, i: usize) -> usize {
    text[i..].chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_pair() {
        let tags = scan("<div>text</div>");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "div");
        assert_eq!(tags[0].text, "<div>text</div>");
        assert_eq!(tags[0].inner_text, "text");
        assert!(!tags[0].unclosed);
        assert_eq!((tags[0].start_index, tags[0].end_index), (0, 15));
    }

    #[test]
    fn test_self_closing_name_has_no_slash() {
        let tags = scan("<br/>");
        assert_eq!(tags[0].name, "br");
        assert!(tags[0].self_closed);

        let tags = scan("<nowiki />");
        assert_eq!(tags[0].name, "nowiki");
        assert!(tags[0].self_closed);
    }

    #[test]
    fn test_empty_comment_is_self_closed() {
        let tags = scan("<!---->");
        assert_eq!(tags[0].name, "comment");
        assert!(tags[0].self_closed);
        assert_eq!(tags[0].inner_text, "");
        assert_eq!((tags[0].start_index, tags[0].end_index), (0, 7));
    }

    #[test]
    fn test_comment_suppresses_tag_recognition() {
        let tags = scan("<!-- <div> -->");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "comment");
        assert_eq!(tags[0].inner_text, " <div> ");
    }

    #[test]
    fn test_mismatched_close_marks_intermediate_unclosed() {
        let tags = scan("<span><div></span>");
        let span = tags.iter().find(|t| t.name == "span").unwrap();
        let div = tags.iter().find(|t| t.name == "div").unwrap();
        assert!(!span.unclosed);
        assert!(div.unclosed);
        // The unclosed tag ends just before the unrelated closing tag
        assert_eq!(div.end_index, 11);
        assert_eq!(span.end_index, 18);
    }

    #[test]
    fn test_unclosed_at_eof() {
        let tags = scan("<pre>rest of text");
        assert_eq!(tags.len(), 1);
        assert!(tags[0].unclosed);
        assert_eq!(tags[0].end_index, 17);
        assert_eq!(tags[0].nest_level, 0);
    }

    #[test]
    fn test_containment_sort() {
        let tags = scan("<div><span>x</span></div>");
        assert_eq!(tags[0].name, "div");
        assert_eq!(tags[1].name, "span");
        assert_eq!(tags[1].nest_level, 1);
    }

    #[test]
    fn test_in_tp_tag_is_strict() {
        let tags = scan("<nowiki>abc</nowiki>");
        assert!(in_tp_tag(&tags, 9, 11));
        // Boundary-touching spans do not count as inside
        assert!(!in_tp_tag(&tags, 0, 20));
    }
}
