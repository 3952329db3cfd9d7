//! Scanner for `{{{parameter}}}` spans.
//!
//! A regex seeds each candidate, but parameters can carry unbalanced inner
//! braces from nested templates (e.g. `{{{1|{{{page|{{PAGENAME}}}}}}}}`,
//! where the seed match stops early). A brace-counting repair pass extends
//! such matches forward until the budget balances; spans that cannot be
//! balanced before end of input are dropped with a diagnostic.

use crate::parse::tags::{Tag, char_len_at, in_tp_tag};
use once_cell::sync::Lazy;
use regex::Regex;

/// One `{{{parameter}}}` occurrence in the wikitext.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Parameter {
    /// The entire text of the parameter.
    pub text: String,
    /// The byte index to the start of the parameter in the wikitext.
    pub start_index: usize,
    /// The byte index up to, but not including, the end of the parameter.
    pub end_index: usize,
    /// The nest level of the parameter (`0` if not nested inside another
    /// parameter).
    pub nest_level: usize,
}

/// Seed pattern; deliberately stops at the first `}`-run, repair extends it.
static PARAMETER_SEED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\{[^{][^}]*\}\}\}").expect("valid regex"));

/// A run of two or more opening braces.
static LEFT_BRACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{{2,}").expect("valid regex"));

/// A run of two or more closing braces.
static RIGHT_BRACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\}{2,}").expect("valid regex"));

/// A run of two or more closing braces at the current position.
static CLOSING_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\}{2,}").expect("valid regex"));

/// Scan the wikitext for parameters, nested ones included.
///
/// Parameters inside a transclusion-preventing tag are excluded from the
/// result but still consume input. After a parameter whose interior itself
/// contains `{{{`, the scan rewinds to just past the outer opening braces
/// so the nested parameter is discovered next, incrementing `nest_level`;
/// the level resets to `0` once a parameter with no further nesting is
/// found.
pub fn scan(wikitext: &str, tp_tags: &[Tag]) -> Vec<Parameter> {
    let mut params: Vec<Parameter> = Vec::new();
    let mut nest_level = 0;
    let mut search_at = 0;

    while search_at <= wikitext.len() {
        let Some(seed) = PARAMETER_SEED.find_at(wikitext, search_at) else {
            break;
        };
        let start_index = seed.start();
        let mut end_index = seed.end();
        let mut text = seed.as_str().to_string();
        search_at = seed.end();

        let left_braces: usize = LEFT_BRACE_RUNS
            .find_iter(&text)
            .map(|m| m.len())
            .sum();
        let mut right_braces: usize = RIGHT_BRACE_RUNS
            .find_iter(&text)
            .map(|m| m.len())
            .sum();

        let mut grammatical = true;
        if left_braces > right_braces {
            // The seed stopped early; walk forward counting closing-brace
            // runs until the budget balances.
            grammatical = false;
            let mut pos = start_index + text.len() - 3;
            right_braces -= 3;
            while pos < wikitext.len() {
                if let Some(run) = CLOSING_RUN.find(&wikitext[pos..]) {
                    if left_braces <= right_braces + run.len() {
                        let last_index = pos + (left_braces - right_braces);
                        text = wikitext[start_index..last_index].to_string();
                        end_index = last_index;
                        search_at = last_index;
                        grammatical = true;
                        break;
                    }
                    right_braces += run.len();
                    pos += run.len();
                } else {
                    pos += char_len_at(wikitext, pos);
                }
            }
        }

        if !grammatical {
            tracing::warn!(parameter = %text, "dropping unparsable parameter");
            continue;
        }

        if in_tp_tag(tp_tags, start_index, end_index) {
            continue;
        }

        params.push(Parameter {
            text: text.clone(),
            start_index,
            end_index,
            nest_level,
        });
        if text[3..].contains("{{{") {
            // Rewind past the outer opening so the nested parameter is
            // discovered on the next iteration
            search_at = start_index + 3;
            nest_level += 1;
        } else {
            nest_level = 0;
        }
    }

    params
}
