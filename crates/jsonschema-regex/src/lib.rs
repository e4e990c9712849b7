//! Dialect analysis for JSON Schema regular expressions.
//!
//! JSON Schema patterns are written in the ECMA-262 dialect. This crate rewrites the handful of
//! constructs whose meaning differs between ECMA-262 and Rust regex engines, classifies patterns
//! that need a backtracking engine, and detects literal patterns that need no engine at all.
mod dialect;
mod literal;

use core::fmt;

pub use dialect::translate;
pub use literal::{analyze_literal, Literal};
use regex_syntax::ast::{self, parse::Parser};

/// What a pattern needs in order to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternInfo {
    /// Pattern text rewritten for Rust regex engines.
    pub translated: String,
    /// Lookaround or backreferences are present; a linear-time engine cannot run it.
    pub requires_backtracking: bool,
    /// The pattern is a plain prefix or exact literal.
    pub literal: Option<Literal>,
}

/// A pattern that cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    pattern: String,
    message: String,
}

impl PatternError {
    pub(crate) fn new(pattern: &str, message: impl Into<String>) -> PatternError {
        PatternError {
            pattern: pattern.to_string(),
            message: message.into(),
        }
    }
    /// The offending pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid regular expression '{}': {}",
            self.pattern, self.message
        )
    }
}

impl std::error::Error for PatternError {}

/// Analyze a pattern without compiling it.
///
/// # Errors
///
/// If the pattern is not syntactically valid. Lookaround and backreferences are not errors here;
/// they are reported through [`PatternInfo::requires_backtracking`].
pub fn analyze(pattern: &str) -> Result<PatternInfo, PatternError> {
    let translated = translate(pattern);
    let requires_backtracking = match Parser::new().parse(&translated) {
        Ok(_) => false,
        Err(error) => match error.kind() {
            ast::ErrorKind::UnsupportedLookAround | ast::ErrorKind::UnsupportedBackreference => {
                true
            }
            _ => return Err(PatternError::new(pattern, error.kind().to_string())),
        },
    };
    Ok(PatternInfo {
        translated: translated.into_owned(),
        requires_backtracking,
        literal: analyze_literal(pattern),
    })
}
