//! The mutable `{{template}}` model.
//!
//! A [`Template`] owns a name (in raw, full, and title-normalized shapes)
//! and an ordered list of [`TemplateArgument`]s. Registration resolves
//! duplicates and hierarchy overrides; rendering turns the model back into
//! wikitext under configurable formatting options.

use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::base::text::{clean, ucfirst};
use crate::base::title::{DefaultTitleResolver, NS_MAIN, NS_TEMPLATE, TitleResolver};
use crate::error::TemplateError;
use crate::template::argument::{NewArg, TemplateArgument};

/// Initializer options for [`Template::new`].
#[derive(Debug, Clone, Default)]
pub struct TemplateConfig {
    /// Full string that should fit into the first slot of the template
    /// (`{{full_name}}`), excluding the braces. May contain whitespace
    /// (`{{ full_name }}`) and/or expressions that are not part of the
    /// template name (`{{ <!--name-->full_name }}`).
    pub full_name: Option<String>,
    /// Argument hierarchies.
    ///
    /// Module-invoking templates may have nested parameters (e.g.
    /// `{{#invoke|module|user={{{1|{{{user|}}}}}}}}`). Pass
    /// `[["1", "user"], ...]` and `|1=` will be overridden by `|user=` when
    /// the template already has `|1=` as an argument.
    pub hierarchy: Vec<Vec<String>>,
}

/// Which shape of the template name to return or render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameProp {
    /// The name as passed to the constructor.
    #[default]
    Raw,
    /// The full first-slot string, redundancies included.
    Full,
    /// The title-normalized name. A `Template:` prefix is truncated and
    /// namespace aliases are canonicalized.
    Clean,
    /// The title-normalized name with redundancies as in the full name.
    FullClean,
}

/// Which argument fields to render unformatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unformatted {
    Name,
    Value,
    Both,
}

/// Search options for [`Template::get_arg`] and [`Template::has_arg`].
#[derive(Default)]
pub struct GetArgOptions<'a> {
    /// Also require the matched argument to meet this predicate.
    pub condition_predicate: Option<&'a dyn Fn(&TemplateArgument) -> bool>,
    /// Return the first match instead of the last.
    pub find_first: bool,
}

/// Per-slot line break decisions, prioritized over
/// [`RenderOptions::linebreak`].
pub struct LinebreakPredicate<'a> {
    /// Whether to put a new line after the name slot. Receives the name in
    /// accordance with `nameprop`.
    pub name: &'a dyn Fn(&str) -> bool,
    /// Whether to put a new line after each argument.
    pub args: &'a dyn Fn(&TemplateArgument) -> bool,
}

/// Rendering options for [`Template::render`].
///
/// `RenderOptions { nameprop: NameProp::Full, unformatted: Some(Unformatted::Both), .. }`
/// produces the output closest to the original notation.
#[derive(Default)]
pub struct RenderOptions<'a> {
    /// Which shape of the template name to render.
    pub nameprop: NameProp,
    /// Whether to prepend `subst:` to the template name.
    pub subst: bool,
    /// Render the unformatted counterparts of argument names and/or values.
    /// Specifying this disables the auto-rendering of the name of an
    /// unnamed argument whose value contains a `=`.
    pub unformatted: Option<Unformatted>,
    /// Sort the arguments by this comparator before rendering.
    pub sort_predicate: Option<&'a dyn Fn(&TemplateArgument, &TemplateArgument) -> Ordering>,
    /// Break lines for each template slot. When set, trailing `\n`s of a
    /// slot are first removed, then a single `\n` is appended.
    pub linebreak: bool,
    /// Per-slot line break decisions; overrides `linebreak`.
    pub linebreak_predicate: Option<LinebreakPredicate<'a>>,
}

/// Leading colon of a template name, surrounding inline whitespace
/// included.
static LEADING_COLON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\S\r\n]*:[^\S\r\n]*").expect("valid regex"));

struct HierMatch {
    /// The position in `args` of the already-registered name or alias.
    index: usize,
    /// `1` if the new name ranks higher in the hierarchy than the
    /// registered one, `-1` if lower, `0` if the same.
    priority: i8,
}

/// A `{{template}}` under construction or mutation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Template {
    /// Name of the page to be transcluded, cleaned. Should not contain
    /// anything but a page title.
    name: String,
    /// Full string fitting into the first slot, possibly with characters
    /// irrelevant to the transcluded title.
    full_name: String,
    /// `name` normalized by title resolution.
    clean_name: String,
    /// `clean_name` with redundancies as in `full_name`.
    full_clean_name: String,
    args: Vec<TemplateArgument>,
    overridden_args: Vec<TemplateArgument>,
    hierarchy: Vec<Vec<String>>,
}

impl Template {
    /// Initialize a new template, resolving the clean name with the
    /// built-in namespace tables.
    ///
    /// # Errors
    ///
    /// Fails when `name` contains an inline line break, or when
    /// `config.full_name` does not contain `name` as a substring.
    pub fn new(name: &str, config: TemplateConfig) -> Result<Self, TemplateError> {
        Self::with_resolver(name, config, &DefaultTitleResolver)
    }

    /// Initialize a new template with a caller-supplied title resolver.
    pub fn with_resolver(
        name: &str,
        config: TemplateConfig,
        resolver: &dyn TitleResolver,
    ) -> Result<Self, TemplateError> {
        let cleaned = clean(name, true);
        if cleaned.contains('\n') {
            return Err(TemplateError::NameWithLineBreak(name.to_string()));
        }
        let full_name = clean(config.full_name.as_deref().unwrap_or(name), false);
        if !full_name.contains(&cleaned) {
            return Err(TemplateError::FullNameMismatch {
                name: cleaned,
                full_name,
            });
        }

        // Truncate the leading colon, if any
        let (colon, stripped) = match LEADING_COLON.find(name) {
            Some(m) => (m.as_str(), &name[m.end()..]),
            None => ("", name),
        };

        let clean_name = match resolver.resolve(stripped) {
            None => format!("{colon}{}", ucfirst(stripped)),
            Some(title) if title.namespace == NS_TEMPLATE => {
                format!("{}{}", title.main, title.concatable_fragment())
            }
            Some(title) if title.namespace == NS_MAIN => {
                format!(
                    "{}{}{}",
                    colon.trim(),
                    title.main,
                    title.concatable_fragment()
                )
            }
            Some(title) => format!("{}{}", title.prefixed, title.concatable_fragment()),
        };
        let full_clean_name = full_name.replacen(&cleaned, &clean_name, 1);

        Ok(Self {
            name: cleaned,
            full_name,
            clean_name,
            full_clean_name,
            args: Vec::new(),
            overridden_args: Vec::new(),
            hierarchy: config.hierarchy,
        })
    }

    /// Get the name of the template in the requested shape.
    pub fn get_name(&self, prop: NameProp) -> &str {
        match prop {
            NameProp::Raw => &self.name,
            NameProp::Full => &self.full_name,
            NameProp::Clean => &self.clean_name,
            NameProp::FullClean => &self.full_clean_name,
        }
    }

    /// Add new arguments, logging overridden ones so they can be inspected
    /// with [`get_overridden_args`](Self::get_overridden_args).
    pub fn add_args(&mut self, new_args: &[NewArg]) -> &mut Self {
        self.register_args(new_args, true);
        self
    }

    /// Set (or update) arguments without logging overrides. New names are
    /// simply added, as with [`add_args`](Self::add_args).
    pub fn set_args(&mut self, new_args: &[NewArg]) -> &mut Self {
        self.register_args(new_args, false);
        self
    }

    /// The arguments of the template, in registration order.
    pub fn args(&self) -> &[TemplateArgument] {
        &self.args
    }

    /// The names of the registered arguments, in registration order.
    pub fn keys(&self) -> Vec<String> {
        self.args.iter().map(|arg| arg.name.clone()).collect()
    }

    /// Get a copy of the argument with the given name, or `None`.
    pub fn get_arg(&self, name: &str, options: GetArgOptions) -> Option<TemplateArgument> {
        self.find_arg(|arg| arg.name == name, options)
    }

    /// Get a copy of the last (or first) argument whose name matches the
    /// pattern.
    pub fn get_arg_by(&self, pattern: &Regex, options: GetArgOptions) -> Option<TemplateArgument> {
        self.find_arg(|arg| pattern.is_match(&arg.name), options)
    }

    /// Whether an argument with the given name is registered.
    pub fn has_arg(&self, name: &str, options: GetArgOptions) -> bool {
        self.find_arg(|arg| arg.name == name, options).is_some()
    }

    /// Whether an argument whose name matches the pattern is registered.
    pub fn has_arg_by(&self, pattern: &Regex, options: GetArgOptions) -> bool {
        self.find_arg(|arg| pattern.is_match(&arg.name), options)
            .is_some()
    }

    /// Delete one argument by name. Returns whether a deletion took place.
    pub fn delete_arg(&mut self, name: &str) -> bool {
        if let Some(idx) = self.args.iter().position(|arg| arg.name == name) {
            self.args.remove(idx);
            true
        } else {
            false
        }
    }

    /// Delete arguments by name, returning the deleted ones.
    pub fn delete_args(&mut self, names: &[&str]) -> Vec<TemplateArgument> {
        let mut deleted = Vec::new();
        for name in names {
            if let Some(idx) = self.args.iter().position(|arg| arg.name == *name) {
                deleted.push(self.args.remove(idx));
            }
        }
        deleted
    }

    /// Copies of the arguments that registration has overridden so far.
    pub fn get_overridden_args(&self) -> Vec<TemplateArgument> {
        self.overridden_args.clone()
    }

    /// A copy of the argument hierarchies.
    pub fn get_hierarchy(&self) -> Vec<Vec<String>> {
        self.hierarchy.clone()
    }

    /// Render the template as wikitext.
    pub fn render(&self, options: &RenderOptions) -> String {
        let subst = if options.subst { "subst:" } else { "" };
        let n = match options.nameprop {
            NameProp::Raw => format!("{subst}{}", self.name),
            NameProp::Full => self
                .full_name
                .replacen(&self.name, &format!("{subst}{}", self.name), 1),
            NameProp::Clean => format!("{subst}{}", self.clean_name),
            NameProp::FullClean => self
                .full_clean_name
                .replacen(&self.clean_name, &format!("{subst}{}", self.clean_name), 1),
        };

        let mut ret = String::from("{{");
        Self::push_slot(&mut ret, &n, options.linebreak, {
            options
                .linebreak_predicate
                .as_ref()
                .map(|lp| (lp.name)(&n))
        });

        let mut args: Vec<&TemplateArgument> = self.args.iter().collect();
        if let Some(sort) = options.sort_predicate {
            args.sort_by(|a, b| sort(*a, *b));
        }
        for arg in args {
            let name = match options.unformatted {
                Some(Unformatted::Name | Unformatted::Both) => &arg.ufname,
                _ => &arg.name,
            };
            let value = match options.unformatted {
                Some(Unformatted::Value | Unformatted::Both) => &arg.ufvalue,
                _ => &arg.value,
            };
            let mut text = String::from("|");
            // An unnamed argument whose value contains "=" must render its
            // name, or the wiki would misparse the value
            if !arg.unnamed || (options.unformatted.is_none() && value.contains('=')) {
                text.push_str(name);
                text.push('=');
            }
            text.push_str(value);
            Self::push_slot(&mut ret, &text, options.linebreak, {
                options
                    .linebreak_predicate
                    .as_ref()
                    .map(|lp| (lp.args)(arg))
            });
        }
        ret.push_str("}}");
        ret
    }

    /// Append one rendered slot, applying the line break policy.
    fn push_slot(out: &mut String, slot: &str, linebreak: bool, predicate: Option<bool>) {
        match predicate {
            Some(wants_break) => {
                out.push_str(slot.trim_end_matches('\n'));
                if wants_break {
                    out.push('\n');
                }
            }
            None if linebreak => {
                out.push_str(slot.trim_end_matches('\n'));
                out.push('\n');
            }
            None => out.push_str(slot),
        }
    }

    fn find_arg(
        &self,
        matches: impl Fn(&TemplateArgument) -> bool,
        options: GetArgOptions,
    ) -> Option<TemplateArgument> {
        let mut first = None;
        let mut last = None;
        for arg in &self.args {
            if matches(arg)
                && options
                    .condition_predicate
                    .is_none_or(|predicate| predicate(arg))
            {
                if first.is_none() {
                    first = Some(arg);
                }
                last = Some(arg);
            }
        }
        if options.find_first { first } else { last }.cloned()
    }

    fn register_args(&mut self, new_args: &[NewArg], log_override: bool) {
        for new_arg in new_args {
            let ufname = new_arg.name.clone();
            let ufvalue = new_arg.value.clone();
            let name = clean(&ufname, true);
            let numeric = !name.is_empty() && name.chars().all(|c| c.is_ascii_digit());
            let unnamed = (numeric && new_arg.force_unnamed) || name.is_empty();
            let value = if unnamed {
                clean(&ufvalue, false).trim_end_matches('\n').to_string()
            } else {
                clean(&ufvalue, true)
            };
            // A value's leading pipe belongs to the slot separator
            let text = format!(
                "|{}{}",
                if unnamed {
                    String::new()
                } else {
                    format!("{name}=")
                },
                value.strip_prefix('|').unwrap_or(&value)
            );
            let uftext = format!(
                "|{}{}",
                if unnamed {
                    String::new()
                } else {
                    format!("{ufname}=")
                },
                ufvalue.strip_prefix('|').unwrap_or(&ufvalue)
            );
            self.register_arg(
                TemplateArgument {
                    name,
                    value,
                    text,
                    ufname,
                    ufvalue,
                    uftext,
                    unnamed,
                },
                log_override,
            );
        }
    }

    fn register_arg(&mut self, mut arg: TemplateArgument, log_override: bool) {
        // Assign the smallest unused integer name to an unnamed argument
        if arg.unnamed {
            let mut n = 1usize;
            arg.name = loop {
                let candidate = n.to_string();
                if !self.args.iter().any(|existing| existing.name == candidate) {
                    break candidate;
                }
                n += 1;
            };
        }

        if let Some(hier) = self.get_hier(&arg.name) {
            let registered_empty = self.args[hier.index].value.is_empty();
            let overrides = (hier.priority == 1 && !arg.value.is_empty())
                || (hier.priority == -1 && registered_empty)
                || (hier.priority == 0 && !arg.value.is_empty());
            if overrides {
                if log_override {
                    self.overridden_args.push(self.args[hier.index].clone());
                }
                self.args.remove(hier.index);
            } else {
                // The registered argument wins; this one becomes the log entry
                if log_override {
                    self.overridden_args.push(arg);
                }
                return;
            }
        } else if let Some(idx) = self.args.iter().position(|existing| existing.name == arg.name) {
            if log_override {
                self.overridden_args.push(self.args[idx].clone());
            }
            self.args.remove(idx);
        }

        self.args.push(arg);
    }

    /// Whether `name` collides, through the hierarchy, with an argument
    /// that is already registered.
    fn get_hier(&self, name: &str) -> Option<HierMatch> {
        if self.hierarchy.is_empty() || self.args.is_empty() {
            return None;
        }
        for aliases in &self.hierarchy {
            let Some(new_rank) = aliases.iter().position(|alias| alias == name) else {
                continue;
            };
            let Some(registered_rank) = aliases
                .iter()
                .position(|alias| self.args.iter().any(|arg| &arg.name == alias))
            else {
                continue;
            };
            let Some(index) = self
                .args
                .iter()
                .position(|arg| aliases.contains(&arg.name))
            else {
                continue;
            };
            let priority = match registered_rank.cmp(&new_rank) {
                Ordering::Greater => -1,
                Ordering::Less => 1,
                Ordering::Equal => 0,
            };
            return Some(HierMatch { index, priority });
        }
        None
    }
}

impl fmt::Display for Template {
    /// Renders with `nameprop: Full` and `unformatted: Both`, the output
    /// closest to the original notation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&RenderOptions {
            nameprop: NameProp::Full,
            unformatted: Some(Unformatted::Both),
            ..Default::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str) -> Template {
        Template::new(name, TemplateConfig::default()).unwrap()
    }

    fn named(name: &str, value: &str) -> NewArg {
        NewArg {
            name: name.to_string(),
            value: value.to_string(),
            force_unnamed: false,
        }
    }

    fn unnamed(value: &str) -> NewArg {
        named("", value)
    }

    #[test]
    fn test_name_shapes() {
        let t = Template::new("Template:test", TemplateConfig::default()).unwrap();
        assert_eq!(t.get_name(NameProp::Raw), "Template:test");
        assert_eq!(t.get_name(NameProp::Full), "Template:test");
        assert_eq!(t.get_name(NameProp::Clean), "Test");
        assert_eq!(t.get_name(NameProp::FullClean), "Test");
    }

    #[test]
    fn test_alias_canonicalized_with_full_name() {
        let t = Template::new(
            "project:test",
            TemplateConfig {
                full_name: Some("<!--change?-->project:test".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(t.get_name(NameProp::Raw), "project:test");
        assert_eq!(t.get_name(NameProp::Full), "<!--change?-->project:test");
        assert_eq!(t.get_name(NameProp::Clean), "Wikipedia:Test");
        assert_eq!(
            t.get_name(NameProp::FullClean),
            "<!--change?-->Wikipedia:Test"
        );
    }

    #[test]
    fn test_name_with_line_break_rejected() {
        let err = Template::new("a\nb", TemplateConfig::default()).unwrap_err();
        assert!(matches!(err, TemplateError::NameWithLineBreak(_)));
    }

    #[test]
    fn test_full_name_must_contain_name() {
        let err = Template::new(
            "Foo",
            TemplateConfig {
                full_name: Some("Bar".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, TemplateError::FullNameMismatch { .. }));
    }

    #[test]
    fn test_unnamed_auto_numbering() {
        let mut t = template("T");
        t.add_args(&[unnamed("a"), unnamed("b")]);
        assert_eq!(t.keys(), ["1", "2"]);
        // "2" taken, next free slot is "3"
        let mut t = template("T");
        t.add_args(&[named("2", "x"), unnamed("a"), unnamed("b")]);
        assert_eq!(t.keys(), ["2", "1", "3"]);
    }

    #[test]
    fn test_duplicate_name_overrides() {
        let mut t = template("T");
        t.add_args(&[named("1", "old"), named("1", "new")]);
        assert_eq!(t.args().len(), 1);
        assert_eq!(t.args()[0].value, "new");
        let overridden = t.get_overridden_args();
        assert_eq!(overridden.len(), 1);
        assert_eq!(overridden[0].value, "old");
    }

    #[test]
    fn test_set_args_does_not_log() {
        let mut t = template("T");
        t.set_args(&[named("1", "old"), named("1", "new")]);
        assert!(t.get_overridden_args().is_empty());
    }

    #[test]
    fn test_hierarchy_higher_alias_wins() {
        let hierarchy = vec![vec!["1".to_string(), "user".to_string()]];
        let mut t = Template::new(
            "T",
            TemplateConfig {
                hierarchy: hierarchy.clone(),
                ..Default::default()
            },
        )
        .unwrap();
        t.add_args(&[named("1", "low"), named("user", "high")]);
        assert_eq!(t.keys(), ["user"]);
        assert_eq!(t.args()[0].value, "high");

        // The lower alias cannot override a non-empty higher one
        let mut t = Template::new(
            "T",
            TemplateConfig {
                hierarchy,
                ..Default::default()
            },
        )
        .unwrap();
        t.add_args(&[named("user", "high"), named("1", "low")]);
        assert_eq!(t.keys(), ["user"]);
        assert_eq!(t.args()[0].value, "high");
        assert_eq!(t.get_overridden_args()[0].value, "low");
    }

    #[test]
    fn test_get_arg_last_and_first() {
        let mut t = template("T");
        t.add_args(&[named("a", "1"), named("b", "2")]);
        assert_eq!(t.get_arg("a", GetArgOptions::default()).unwrap().value, "1");
        assert!(t.get_arg("c", GetArgOptions::default()).is_none());
        assert!(t.has_arg("b", GetArgOptions::default()));
        let by = t
            .get_arg_by(&Regex::new("^[ab]$").unwrap(), GetArgOptions::default())
            .unwrap();
        assert_eq!(by.name, "b");
        let by_first = t
            .get_arg_by(
                &Regex::new("^[ab]$").unwrap(),
                GetArgOptions {
                    find_first: true,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(by_first.name, "a");
    }

    #[test]
    fn test_delete_args() {
        let mut t = template("T");
        t.add_args(&[named("a", "1"), named("b", "2"), named("c", "3")]);
        let deleted = t.delete_args(&["a", "x", "c"]);
        assert_eq!(deleted.len(), 2);
        assert_eq!(t.keys(), ["b"]);
        assert!(t.delete_arg("b"));
        assert!(!t.delete_arg("b"));
    }

    #[test]
    fn test_render_basic() {
        let mut t = template("T");
        t.add_args(&[named("name", "x"), unnamed("y")]);
        assert_eq!(t.render(&RenderOptions::default()), "{{T|name=x|y}}");
    }

    #[test]
    fn test_render_unnamed_with_equals_gets_named() {
        let mut t = template("T");
        t.add_args(&[unnamed("a=b")]);
        assert_eq!(t.render(&RenderOptions::default()), "{{T|1=a=b}}");
        // Unformatted rendering disables the defensive naming
        assert_eq!(
            t.render(&RenderOptions {
                unformatted: Some(Unformatted::Both),
                ..Default::default()
            }),
            "{{T|a=b}}"
        );
    }

    #[test]
    fn test_render_subst_and_linebreak() {
        let mut t = template("T");
        t.add_args(&[named("a", "1")]);
        assert_eq!(
            t.render(&RenderOptions {
                subst: true,
                linebreak: true,
                ..Default::default()
            }),
            "{{subst:T\n|a=1\n}}"
        );
    }

    #[test]
    fn test_render_unformatted_preserves_spacing() {
        let mut t = template("T");
        t.add_args(&[named(" a ", " 1 ")]);
        assert_eq!(t.render(&RenderOptions::default()), "{{T|a=1}}");
        assert_eq!(
            t.render(&RenderOptions {
                unformatted: Some(Unformatted::Both),
                ..Default::default()
            }),
            "{{T| a = 1 }}"
        );
    }

    #[test]
    fn test_display_is_original_notation() {
        let mut t = template("T");
        t.add_args(&[named(" a ", " 1 ")]);
        assert_eq!(t.to_string(), "{{T| a = 1 }}");
    }

    #[test]
    fn test_render_sorted() {
        let mut t = template("T");
        t.add_args(&[named("b", "2"), named("a", "1")]);
        let rendered = t.render(&RenderOptions {
            sort_predicate: Some(&|x, y| x.name.cmp(&y.name)),
            ..Default::default()
        });
        assert_eq!(rendered, "{{T|a=1|b=2}}");
    }
}
