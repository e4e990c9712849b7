/// A pattern that reduces to a plain string comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// `^prefix` matches with `starts_with(prefix)`.
    Prefix(String),
    /// `^exact$` matches with `== exact`.
    Exact(String),
}

/// Analyze a pattern and return a [`Literal`] if one applies, or `None` if a full regex engine
/// is required.
///
/// Accepts unescaped alphanumeric chars, `-`, `_`, `/` and the escapes `\/`, `\-`, `\_`, `\$`,
/// `\.` in the literal body. A trailing unescaped `$` turns the result into [`Literal::Exact`].
#[must_use]
pub fn analyze_literal(pattern: &str) -> Option<Literal> {
    let suffix = pattern.strip_prefix('^')?;
    let mut literal = String::new();
    let mut chars = suffix.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next()? {
                c @ ('/' | '-' | '_' | '$' | '.') => literal.push(c),
                _ => return None,
            }
        } else if c == '$' {
            if chars.peek().is_none() {
                return Some(Literal::Exact(literal));
            }
            return None;
        } else if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/') {
            literal.push(c);
        } else {
            return None;
        }
    }
    Some(Literal::Prefix(literal))
}
