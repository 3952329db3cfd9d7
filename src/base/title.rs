//! Page-title canonicalization as an injected capability.
//!
//! Template name cleaning depends on wiki-specific configuration (namespace
//! aliases, first-letter capitalization). The parsing core must not depend
//! on a live wiki, so the rules are behind the [`TitleResolver`] trait with
//! an offline [`DefaultTitleResolver`] modeled on a stock English-language
//! configuration. Callers talking to a differently-configured wiki supply
//! their own implementation.

use crate::base::text::ucfirst;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

/// The template namespace number.
pub const NS_TEMPLATE: i32 = 10;

/// The main (article) namespace number.
pub const NS_MAIN: i32 = 0;

/// A page title resolved into its canonical parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle {
    /// The namespace number (`0` for the main namespace).
    pub namespace: i32,
    /// The main part of the title, first letter capitalized.
    pub main: String,
    /// The `#fragment` part, without the leading `#`.
    pub fragment: Option<String>,
    /// The canonical prefixed form (`Namespace:Main`, or `Main` in the main
    /// namespace).
    pub prefixed: String,
}

impl ResolvedTitle {
    /// The fragment with its `#` prefix, or an empty string.
    pub(crate) fn concatable_fragment(&self) -> String {
        match &self.fragment {
            Some(f) => format!("#{f}"),
            None => String::new(),
        }
    }
}

/// Resolution of page titles into canonical namespace/main/fragment parts.
///
/// Returning `None` signals an unresolvable title; callers fall back to a
/// plain first-letter capitalization.
pub trait TitleResolver {
    fn resolve(&self, title: &str) -> Option<ResolvedTitle>;
}

/// Namespace aliases recognized by the default resolver, lowercased.
static NAMESPACE_ALIASES: Lazy<FxHashMap<&'static str, i32>> = Lazy::new(|| {
    [
        ("talk", 1),
        ("user", 2),
        ("user talk", 3),
        ("project", 4),
        ("wikipedia", 4),
        ("wp", 4),
        ("project talk", 5),
        ("wikipedia talk", 5),
        ("file", 6),
        ("image", 6),
        ("file talk", 7),
        ("image talk", 7),
        ("mediawiki", 8),
        ("mediawiki talk", 9),
        ("template", NS_TEMPLATE),
        ("template talk", 11),
        ("help", 12),
        ("help talk", 13),
        ("category", 14),
        ("category talk", 15),
        ("special", -1),
    ]
    .into_iter()
    .collect()
});

/// Canonical namespace names by number.
static NAMESPACE_NAMES: Lazy<FxHashMap<i32, &'static str>> = Lazy::new(|| {
    [
        (1, "Talk"),
        (2, "User"),
        (3, "User talk"),
        (4, "Wikipedia"),
        (5, "Wikipedia talk"),
        (6, "File"),
        (7, "File talk"),
        (8, "MediaWiki"),
        (9, "MediaWiki talk"),
        (NS_TEMPLATE, "Template"),
        (11, "Template talk"),
        (12, "Help"),
        (13, "Help talk"),
        (14, "Category"),
        (15, "Category talk"),
        (-1, "Special"),
    ]
    .into_iter()
    .collect()
});

/// Characters that cannot appear in a page title.
const ILLEGAL_TITLE_CHARS: [char; 7] = ['<', '>', '[', ']', '{', '}', '|'];

/// Offline title resolver with a stock namespace table.
///
/// Underscores are treated as spaces, runs of whitespace collapse, and the
/// first letter of the main part is capitalized.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTitleResolver;

impl DefaultTitleResolver {
    fn normalize(part: &str) -> String {
        let replaced = part.replace('_', " ");
        let mut out = String::with_capacity(replaced.len());
        let mut last_space = false;
        for c in replaced.trim().chars() {
            if c == ' ' {
                if !last_space {
                    out.push(c);
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }
        out
    }
}

impl TitleResolver for DefaultTitleResolver {
    fn resolve(&self, title: &str) -> Option<ResolvedTitle> {
        let (base, fragment) = match title.split_once('#') {
            Some((b, f)) => (b, Some(f.trim().to_string())),
            None => (title, None),
        };

        if base.contains(&ILLEGAL_TITLE_CHARS[..]) || base.contains('\n') {
            return None;
        }

        let (namespace, main_raw) = match base.split_once(':') {
            Some((prefix, rest)) => {
                let key = Self::normalize(prefix).to_lowercase();
                match NAMESPACE_ALIASES.get(key.as_str()) {
                    Some(&ns) => (ns, rest),
                    None => (NS_MAIN, base),
                }
            }
            None => (NS_MAIN, base),
        };

        let main = ucfirst(&Self::normalize(main_raw));
        if main.is_empty() {
            return None;
        }

        let prefixed = if namespace == NS_MAIN {
            main.clone()
        } else {
            format!("{}:{}", NAMESPACE_NAMES[&namespace], main)
        };

        Some(ResolvedTitle {
            namespace,
            main,
            fragment,
            prefixed,
        })
    }
}
