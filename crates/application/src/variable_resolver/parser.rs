//! Reference parser for `$(variable)` syntax
//!
//! A reference token is `$(` followed by one or more word characters and `)`.
//! There is no nesting: `$($(a))` contains only the token `$(a)`.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\((\w+)\)").expect("valid reference regex"));

#[allow(clippy::expect_used)]
static WHOLE_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A\$\((\w+)\)\n?\z").expect("valid whole-value regex"));

/// A reference token found in a raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The referenced name, without `$(` and `)`.
    pub name: String,

    /// Byte range of the full token in the original string.
    pub span: Range<usize>,
}

impl VariableReference {
    /// Creates a new variable reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// Returns the full token text (`$(name)`) from the string it was parsed from.
    ///
    /// Returns `None` if the span does not fall on valid boundaries of `input`.
    #[must_use]
    pub fn token<'a>(&self, input: &'a str) -> Option<&'a str> {
        input.get(self.span.clone())
    }
}

/// Parses a string and extracts all reference tokens, left to right.
///
/// # Examples
///
/// ```
/// use confvar_application::variable_resolver::parser::parse_references;
///
/// let refs = parse_references("$(prefix)/lib/$(arch)");
/// assert_eq!(refs.len(), 2);
/// assert_eq!(refs[0].name, "prefix");
/// assert_eq!(refs[1].name, "arch");
/// ```
#[must_use]
pub fn parse_references(input: &str) -> Vec<VariableReference> {
    REFERENCE_RE
        .captures_iter(input)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(VariableReference::new(name.as_str(), whole.range()))
        })
        .collect()
}

/// Returns the referenced name if `input` is exactly one reference token.
///
/// Such values splice the referenced sequence instead of substituting text.
/// A single trailing newline after the token is tolerated.
#[must_use]
pub fn whole_value_reference(input: &str) -> Option<&str> {
    WHOLE_VALUE_RE
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Returns true if the input contains at least one reference token.
#[must_use]
pub fn has_references(input: &str) -> bool {
    REFERENCE_RE.is_match(input)
}

/// Extracts just the referenced names, in order of appearance.
#[must_use]
pub fn extract_reference_names(input: &str) -> Vec<String> {
    parse_references(input).into_iter().map(|r| r.name).collect()
}
