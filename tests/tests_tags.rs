//! Tag Scanner Tests
//!
//! Verify `<tag>` and `<!---->` recognition through the `Wikitext` facade:
//! names, spans, self-closing and unclosed detection, nesting, and the
//! comment state that suppresses all other tag recognition.

use rstest::rstest;
use wikitext::{ParseTagsConfig, Tag, Wikitext};

fn parse(source: &str) -> Vec<Tag> {
    Wikitext::new(source).parse_tags(&ParseTagsConfig::default())
}

// ============================================================================
// Names and self-closing
// ============================================================================

#[rstest]
#[case("<div>x</div>", "div", false)]
#[case("<DIV>x</DIV>", "div", false)]
#[case("<br/>", "br", true)]
#[case("<br />", "br", true)]
#[case("<nowiki />", "nowiki", true)]
#[case("<!---->", "comment", true)]
#[case("<!-- x -->", "comment", false)]
#[case("<ref name=\"a\">x</ref>", "ref", false)]
fn test_tag_name_and_self_closed(
    #[case] source: &str,
    #[case] expected_name: &str,
    #[case] expected_self_closed: bool,
) {
    let tags = parse(source);
    assert_eq!(tags.len(), 1, "{source}");
    assert_eq!(tags[0].name, expected_name);
    assert_eq!(tags[0].self_closed, expected_self_closed);
    assert!(!tags[0].unclosed);
}

#[rstest]
#[case("< div>not a tag</div>")]
#[case("<>empty</>")]
fn test_malformed_opening_is_not_a_tag(#[case] source: &str) {
    // A stray closer with no open entry flushes nothing
    assert!(parse(source).is_empty(), "{source}");
}

// ============================================================================
// Spans and inner text
// ============================================================================

#[test]
fn test_spans_and_inner_text() {
    let source = "a<div class=\"x\">inner</div>b";
    let tags = parse(source);
    assert_eq!(tags.len(), 1);
    let tag = &tags[0];
    assert_eq!(tag.text, "<div class=\"x\">inner</div>");
    assert_eq!(tag.inner_text, "inner");
    assert_eq!(&source[tag.start_index..tag.end_index], tag.text);
}

#[test]
fn test_comment_inner_text() {
    let tags = parse("<!-- hidden <div> -->");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "comment");
    assert_eq!(tags[0].inner_text, " hidden <div> ");
}

// ============================================================================
// Nesting and ordering
// ============================================================================

#[test]
fn test_nested_tags_sorted_container_first() {
    let tags = parse("<div><span><b>x</b></span></div>");
    let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["div", "span", "b"]);
    let levels: Vec<usize> = tags.iter().map(|t| t.nest_level).collect();
    assert_eq!(levels, [0, 1, 2]);
}

#[test]
fn test_siblings_in_document_order() {
    let tags = parse("<b>x</b><i>y</i>");
    assert_eq!(tags[0].name, "b");
    assert_eq!(tags[1].name, "i");
    assert_eq!(tags[1].nest_level, 0);
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn test_unclosed_tag_runs_to_eof() {
    let source = "text <pre>rest";
    let tags = parse(source);
    assert_eq!(tags.len(), 1);
    assert!(tags[0].unclosed);
    assert_eq!(tags[0].end_index, source.len());
    assert_eq!(tags[0].inner_text, "rest");
}

#[test]
fn test_unclosed_comment_runs_to_eof() {
    let tags = parse("a<!--never closed");
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].name, "comment");
    assert!(tags[0].unclosed);
}

#[test]
fn test_mismatched_closer_closes_outer_and_flags_inner() {
    let tags = parse("<span><div>x</span>");
    let span = tags.iter().find(|t| t.name == "span").unwrap();
    let div = tags.iter().find(|t| t.name == "div").unwrap();
    assert!(!span.unclosed);
    assert!(div.unclosed);
    assert!(div.end_index < span.end_index);
}

// ============================================================================
// Filtering and memoization
// ============================================================================

#[test]
fn test_condition_predicate_filters_result_not_memo() {
    let doc = Wikitext::new("<div>x</div><!--c--><nowiki>y</nowiki>");
    let filtered = doc.parse_tags(&ParseTagsConfig {
        condition_predicate: Some(&|tag| tag.name == "nowiki"),
    });
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "nowiki");
    assert_eq!(doc.tags().unwrap().len(), 3);
}
