//! Text normalization and slice comparison helpers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Unicode bidirectional control characters (LRM, RLM, U+202A-202E).
///
/// The character set is adapted from the title normalization rules of
/// MediaWiki core.
static BIDI_MARKS: Lazy<Regex> =
    Lazy::new(|| Regex::new("[\u{200E}\u{200F}\u{202A}-\u{202E}]+").expect("valid regex"));

/// Remove Unicode bidirectional control characters from a string and,
/// optionally, leading/trailing whitespace.
///
/// Pure and total: there is no input for which this fails.
///
/// # Example
/// ```
/// use wikitext::base::clean;
///
/// assert_eq!(clean(" foo\u{200E} ", true), "foo");
/// assert_eq!(clean(" foo\u{200E} ", false), " foo ");
/// ```
pub fn clean(str: &str, trim: bool) -> String {
    let stripped = BIDI_MARKS.replace_all(str, "");
    if trim {
        stripped.trim().to_string()
    } else {
        stripped.into_owned()
    }
}

/// Uppercase the first character of a string.
///
/// Unicode-aware: a character whose uppercase form expands to multiple
/// characters (e.g. `ß`) is expanded in place.
pub fn ucfirst(str: &str) -> String {
    let mut chars = str.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Check whether two slices hold the same elements.
///
/// With `order_insensitive`, two slices compare equal when they have the
/// same length and every element of the first occurs somewhere in the
/// second, regardless of position.
pub fn arrays_equal<T: PartialEq>(array1: &[T], array2: &[T], order_insensitive: bool) -> bool {
    if order_insensitive {
        array1.len() == array2.len() && array1.iter().all(|el| array2.contains(el))
    } else {
        array1 == array2
    }
}

/// The differences between two slices, as computed by [`arrays_diff`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArraysDiff<T> {
    /// Elements present in the target but not in the source.
    pub added: Vec<T>,
    /// Elements present in the source but not in the target.
    pub removed: Vec<T>,
}

/// Compare elements in two slices and collect the differences.
pub fn arrays_diff<T: Clone + PartialEq>(source: &[T], target: &[T]) -> ArraysDiff<T> {
    let removed = source
        .iter()
        .filter(|el| !target.contains(el))
        .cloned()
        .collect();
    let added = target
        .iter()
        .filter(|el| !source.contains(el))
        .cloned()
        .collect();
    ArraysDiff { added, removed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_bidi_marks() {
        assert_eq!(clean("a\u{200E}b\u{200F}c", true), "abc");
        assert_eq!(clean("\u{202A}\u{202B}\u{202C}\u{202D}\u{202E}", true), "");
        assert_eq!(clean("plain", true), "plain");
    }

    #[test]
    fn test_clean_trim_flag() {
        assert_eq!(clean("  x  ", true), "x");
        assert_eq!(clean("  x  ", false), "  x  ");
        assert_eq!(clean("\n x \t", true), "x");
    }

    #[test]
    fn test_ucfirst() {
        assert_eq!(ucfirst("template"), "Template");
        assert_eq!(ucfirst("Template"), "Template");
        assert_eq!(ucfirst(""), "");
        assert_eq!(ucfirst("éclair"), "Éclair");
    }

    #[test]
    fn test_arrays_equal_ordered() {
        assert!(arrays_equal(&[1, 2, 3], &[1, 2, 3], false));
        assert!(!arrays_equal(&[1, 2, 3], &[3, 2, 1], false));
        assert!(arrays_equal::<i32>(&[], &[], false));
        assert!(!arrays_equal(&[1], &[1, 1], false));
    }

    #[test]
    fn test_arrays_equal_order_insensitive() {
        assert!(arrays_equal(&[1, 2, 3], &[3, 2, 1], true));
        assert!(!arrays_equal(&[1, 2], &[1, 3], true));
        assert!(arrays_equal::<&str>(&[], &[], true));
    }

    #[test]
    fn test_arrays_diff() {
        let diff = arrays_diff(&["a", "b", "c"], &["b", "c", "d"]);
        assert_eq!(diff.added, vec!["d"]);
        assert_eq!(diff.removed, vec!["a"]);

        let none = arrays_diff(&[1, 2], &[1, 2]);
        assert!(none.added.is_empty() && none.removed.is_empty());
    }
}
