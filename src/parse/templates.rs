//! Scanner for `{{template}}` occurrences.
//!
//! A brace-depth state machine over the input, with three shortcuts that
//! consume whole spans at once: transclusion-preventing tags, `{{{...}}}`
//! parameters, and `[[wikilinks]]`. Inside a template, characters are fed
//! into argument slots one fragment at a time; a closing `}}` at depth two
//! finalizes the occurrence, and its inner text is rescanned for nested
//! templates.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parse::parameters::{self, Parameter};
use crate::parse::tags::{self, Tag, char_len_at, is_transclusion_preventing};
use crate::template::model::NameProp;
use crate::template::parsed::{ParsedArgument, ParsedTemplate, ParsedTemplateParam};

/// Parsing config of
/// [`Wikitext::parse_templates`](crate::Wikitext::parse_templates).
#[derive(Default)]
pub struct ParseTemplatesConfig<'a> {
    /// Argument hierarchies, handed to every parsed template. See
    /// [`TemplateConfig`](crate::TemplateConfig).
    pub hierarchy: Vec<Vec<String>>,
    /// Only include templates whose clean name matches this predicate.
    pub name_predicate: Option<&'a dyn Fn(&str) -> bool>,
    /// Only include templates that match this predicate.
    pub template_predicate: Option<&'a dyn Fn(&ParsedTemplate) -> bool>,
    /// Parse nested templates in accordance with this predicate, which
    /// receives the containing template (`None` if its construction
    /// failed). By default all nested templates are parsed.
    pub recursive_predicate: Option<&'a dyn Fn(Option<&ParsedTemplate>) -> bool>,
}

/// A complete `[[wikilink]]` with no inner square brackets.
static WIKILINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\[[^\[\]]*?\]\]").expect("valid regex"));

/// How a fragment relates to the slot being accumulated.
enum Fragment {
    /// Ordinary content.
    Plain,
    /// A `|` at depth two; opens a new argument slot.
    NewSlot,
    /// An opaque span (tag, parameter, wikilink) that can never be part of
    /// a template name or argument name.
    NonName,
}

/// Feed one fragment into the argument accumulator.
///
/// `args[0]` is the name slot: `text` is the whole slot (possibly with
/// redundancies, as in `{{T<!--x-->|a=}}`) and `name` its clean
/// counterpart. Later slots keep the leading pipe on `name` so that an
/// unnamed argument whose value starts with `=` is not misread.
fn process_fragment(args: &mut Vec<ParsedArgument>, fragment: &str, kind: Fragment) {
    let new_slot = matches!(kind, Fragment::NewSlot);
    let nonname = matches!(kind, Fragment::NonName);
    let idx = if new_slot {
        args.len()
    } else {
        args.len().saturating_sub(1)
    };
    if idx == args.len() {
        args.push(ParsedArgument::default());
    }
    let slot = &mut args[idx];

    if idx == 0 {
        slot.text.push_str(fragment);
        if !nonname {
            slot.name.push_str(fragment);
        }
        return;
    }
    let eq = if nonname || !slot.name.is_empty() {
        None
    } else {
        fragment.find('=')
    };
    if let Some(eq) = eq {
        // First "=" of the slot names the argument
        slot.name = format!("{}{}", slot.text, &fragment[..eq]);
        slot.text.push_str(fragment);
        slot.value = slot.text[slot.name.len() + 1..].to_string();
    } else {
        slot.text.push_str(fragment);
        slot.value.push_str(fragment);
    }
}

/// Scan `wikitext` for templates.
///
/// `tp_tags` and `params` are the transclusion-preventing tags and
/// top-level parameters of the same text; their spans are consumed whole so
/// braces and pipes inside them never affect template structure.
pub(crate) fn scan(
    wikitext: &str,
    tp_tags: &[Tag],
    params: &[Parameter],
    config: &ParseTemplatesConfig,
    nest_level: usize,
) -> Vec<ParsedTemplate> {
    let mut templates: Vec<ParsedTemplate> = Vec::new();
    let mut args: Vec<ParsedArgument> = Vec::new();
    let mut num_unclosed = 0usize;
    let mut start_idx = 0usize;
    let mut tag_ptr = 0usize;
    let mut param_ptr = 0usize;

    let mut i = 0;
    while i < wikitext.len() {
        let rest = &wikitext[i..];

        while tag_ptr < tp_tags.len() && tp_tags[tag_ptr].start_index < i {
            tag_ptr += 1;
        }
        if tag_ptr < tp_tags.len() && tp_tags[tag_ptr].start_index == i {
            let text = &tp_tags[tag_ptr].text;
            if num_unclosed != 0 {
                process_fragment(&mut args, text, Fragment::NonName);
            }
            tag_ptr += 1;
            i += text.len();
            continue;
        }

        while param_ptr < params.len() && params[param_ptr].start_index < i {
            param_ptr += 1;
        }
        if param_ptr < params.len() && params[param_ptr].start_index == i {
            let text = &params[param_ptr].text;
            if num_unclosed != 0 {
                process_fragment(&mut args, text, Fragment::NonName);
            }
            param_ptr += 1;
            i += text.len();
            continue;
        }

        if let Some(m) = WIKILINK.find(rest) {
            if num_unclosed != 0 {
                process_fragment(&mut args, m.as_str(), Fragment::NonName);
            }
            i += m.len();
            continue;
        }

        if num_unclosed == 0 {
            // Not in a template
            if rest.starts_with("{{") {
                start_idx = i;
                args.clear();
                num_unclosed += 2;
                i += 2;
            } else {
                i += char_len_at(wikitext, i);
            }
        } else if num_unclosed == 2 {
            // Looking for the closing braces of the current template
            if rest.starts_with("{{") {
                num_unclosed += 2;
                process_fragment(&mut args, "{{", Fragment::Plain);
                i += 2;
            } else if rest.starts_with("}}") {
                let (name, full_name) = args
                    .first()
                    .map_or_else(Default::default, |slot| (slot.name.clone(), slot.text.clone()));
                let end_idx = i + 2;
                let text = &wikitext[start_idx..end_idx];
                let template = match ParsedTemplate::from_parsed(ParsedTemplateParam {
                    name,
                    full_name,
                    args: args.get(1..).unwrap_or_default().to_vec(),
                    text: text.to_string(),
                    start_index: start_idx,
                    end_index: end_idx,
                    hierarchy: config.hierarchy.clone(),
                    nest_level,
                }) {
                    Ok(template) => Some(template),
                    Err(err) => {
                        tracing::debug!(%err, template = %text, "skipping malformed template");
                        None
                    }
                };

                let recurse = config
                    .recursive_predicate
                    .is_none_or(|predicate| predicate(template.as_ref()));
                if let Some(template) = template {
                    if config
                        .name_predicate
                        .is_none_or(|predicate| predicate(template.get_name(NameProp::Clean)))
                        && config
                            .template_predicate
                            .is_none_or(|predicate| predicate(&template))
                    {
                        templates.push(template);
                    }
                }
                if recurse {
                    let inner = &text[2..text.len() - 2];
                    if inner.contains("{{") && inner.contains("}}") {
                        let inner_tags: Vec<Tag> = tags::scan(inner)
                            .into_iter()
                            .filter(|tag| is_transclusion_preventing(&tag.name))
                            .collect();
                        let inner_params: Vec<Parameter> = parameters::scan(inner, &inner_tags)
                            .into_iter()
                            .filter(|param| param.nest_level == 0)
                            .collect();
                        let mut nested =
                            scan(inner, &inner_tags, &inner_params, config, nest_level + 1);
                        for template in &mut nested {
                            template.shift(start_idx + 2);
                        }
                        templates.append(&mut nested);
                    }
                }
                num_unclosed -= 2;
                i += 2;
            } else {
                let ch = &rest[..char_len_at(wikitext, i)];
                let kind = if ch == "|" {
                    Fragment::NewSlot
                } else {
                    Fragment::Plain
                };
                process_fragment(&mut args, ch, kind);
                i += ch.len();
            }
        } else {
            // In a nested template; track depth, pass text through
            if rest.starts_with("{{") {
                num_unclosed += 2;
                process_fragment(&mut args, "{{", Fragment::Plain);
                i += 2;
            } else if rest.starts_with("}}") {
                num_unclosed -= 2;
                process_fragment(&mut args, "}}", Fragment::Plain);
                i += 2;
            } else {
                let ch = &rest[..char_len_at(wikitext, i)];
                process_fragment(&mut args, ch, Fragment::Plain);
                i += ch.len();
            }
        }
    }

    templates
}
