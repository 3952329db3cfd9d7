//! Argument records of a template.

/// One argument of a [`Template`](crate::Template), in both formatted and
/// unformatted (`uf`-prefixed) shapes.
///
/// The formatted fields have whitespace cleaned per wiki conventions; the
/// unformatted ones preserve the caller's spacing so the original layout
/// can be rendered back (e.g. `| 1 = value `).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TemplateArgument {
    /// The formatted name of the argument. Auto-numbered for unnamed ones.
    pub name: String,
    /// The formatted value of the argument.
    pub value: String,
    /// The whole formatted argument as wikitext (e.g. `|1=value`). The name
    /// is not rendered for unnamed arguments.
    pub text: String,
    /// The unformatted name, as passed in.
    pub ufname: String,
    /// The unformatted value, as passed in.
    pub ufvalue: String,
    /// The whole unformatted argument as wikitext. The name is not rendered
    /// for unnamed arguments.
    pub uftext: String,
    /// Whether the argument is unnamed.
    pub unnamed: bool,
}

/// Specification of an argument to add to a [`Template`](crate::Template),
/// used by [`add_args`](crate::Template::add_args) and
/// [`set_args`](crate::Template::set_args).
#[derive(Debug, Clone, Default)]
pub struct NewArg {
    /// The name of the new argument. May be empty, in which case the
    /// smallest unused integer name is assigned automatically. Leading and
    /// trailing spaces are preserved in the unformatted rendering.
    pub name: String,
    /// The value of the new argument. May end with `\n` when the argument
    /// should have a line break before the next slot, although that is
    /// usually better controlled through the rendering options.
    pub value: String,
    /// Forcibly register this argument as unnamed. Ignored unless the
    /// formatted name is an integer.
    pub force_unnamed: bool,
}
