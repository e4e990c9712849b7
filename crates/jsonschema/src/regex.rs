//! Regex engine selection and compiled patterns.
use jsonschema_regex::Literal;

/// Configuration for the backtracking engine (`fancy-regex`).
#[derive(Debug, Clone, Default)]
pub struct FancyRegex {
    backtrack_limit: Option<usize>,
    size_limit: Option<usize>,
    dfa_size_limit: Option<usize>,
}

/// Configuration for the linear-time engine (`regex`).
#[derive(Debug, Clone, Default)]
pub struct StandardRegex {
    size_limit: Option<usize>,
    dfa_size_limit: Option<usize>,
}

/// Options for compiling `pattern`, `patternProperties` and `format: regex`.
///
/// ```rust
/// use jsonschema::PatternOptions;
///
/// let backtracking = PatternOptions::fancy_regex().backtrack_limit(10_000);
/// let linear = PatternOptions::regex().size_limit(1 << 20);
/// ```
#[derive(Debug, Clone)]
pub struct PatternOptions<E> {
    engine: E,
}

impl PatternOptions<FancyRegex> {
    /// Backtracking engine. Supports lookaround and backreferences.
    #[must_use]
    pub fn fancy_regex() -> Self {
        PatternOptions {
            engine: FancyRegex::default(),
        }
    }
    /// Upper bound on backtracking steps for a single match.
    #[must_use]
    pub fn backtrack_limit(mut self, limit: usize) -> Self {
        self.engine.backtrack_limit = Some(limit);
        self
    }
    /// Size limit of the compiled regex delegated to the linear engine.
    #[must_use]
    pub fn size_limit(mut self, limit: usize) -> Self {
        self.engine.size_limit = Some(limit);
        self
    }
    /// Size limit of the lazy DFA cache.
    #[must_use]
    pub fn dfa_size_limit(mut self, limit: usize) -> Self {
        self.engine.dfa_size_limit = Some(limit);
        self
    }
}

impl PatternOptions<StandardRegex> {
    /// Linear-time engine. Patterns that need backtracking are rejected at compile time.
    #[must_use]
    pub fn regex() -> Self {
        PatternOptions {
            engine: StandardRegex::default(),
        }
    }
    #[must_use]
    pub fn size_limit(mut self, limit: usize) -> Self {
        self.engine.size_limit = Some(limit);
        self
    }
    #[must_use]
    pub fn dfa_size_limit(mut self, limit: usize) -> Self {
        self.engine.dfa_size_limit = Some(limit);
        self
    }
}

/// The configured engine, with its limits.
#[derive(Debug, Clone)]
pub enum PatternEngine {
    FancyRegex(FancyRegex),
    Regex(StandardRegex),
}

impl Default for PatternEngine {
    fn default() -> Self {
        PatternEngine::FancyRegex(FancyRegex::default())
    }
}

impl From<PatternOptions<FancyRegex>> for PatternEngine {
    fn from(options: PatternOptions<FancyRegex>) -> Self {
        PatternEngine::FancyRegex(options.engine)
    }
}

impl From<PatternOptions<StandardRegex>> for PatternEngine {
    fn from(options: PatternOptions<StandardRegex>) -> Self {
        PatternEngine::Regex(options.engine)
    }
}

/// A pattern ready for matching.
#[derive(Debug)]
pub(crate) enum CompiledPattern {
    /// `^prefix` matched with `starts_with`.
    Prefix(String),
    /// `^exact$` matched with `==`.
    Exact(String),
    Fancy(fancy_regex::Regex),
    Standard(regex::Regex),
}

impl CompiledPattern {
    /// Whether `text` matches. Fails only if the backtracking engine gives up.
    pub(crate) fn is_match(&self, text: &str) -> Result<bool, fancy_regex::Error> {
        match self {
            CompiledPattern::Prefix(prefix) => Ok(text.starts_with(prefix.as_str())),
            CompiledPattern::Exact(exact) => Ok(text == exact),
            CompiledPattern::Fancy(regex) => regex.is_match(text),
            CompiledPattern::Standard(regex) => Ok(regex.is_match(text)),
        }
    }
}

/// Compile an ECMA-262 pattern with the configured engine.
///
/// The error is a human-readable description of why the pattern was rejected.
pub(crate) fn compile(pattern: &str, engine: &PatternEngine) -> Result<CompiledPattern, String> {
    let info = jsonschema_regex::analyze(pattern).map_err(|error| error.message().to_string())?;
    match info.literal {
        Some(Literal::Prefix(prefix)) => return Ok(CompiledPattern::Prefix(prefix)),
        Some(Literal::Exact(exact)) => return Ok(CompiledPattern::Exact(exact)),
        None => {}
    }
    match engine {
        PatternEngine::FancyRegex(options) => {
            let mut builder = fancy_regex::RegexBuilder::new(&info.translated);
            if let Some(limit) = options.backtrack_limit {
                builder.backtrack_limit(limit);
            }
            if let Some(limit) = options.size_limit {
                builder.delegate_size_limit(limit);
            }
            if let Some(limit) = options.dfa_size_limit {
                builder.delegate_dfa_size_limit(limit);
            }
            builder
                .build()
                .map(CompiledPattern::Fancy)
                .map_err(|error| error.to_string())
        }
        PatternEngine::Regex(options) => {
            if info.requires_backtracking {
                return Err(
                    "lookaround and backreferences are not supported by the linear-time regex engine"
                        .to_string(),
                );
            }
            let mut builder = regex::RegexBuilder::new(&info.translated);
            if let Some(limit) = options.size_limit {
                builder.size_limit(limit);
            }
            if let Some(limit) = options.dfa_size_limit {
                builder.dfa_size_limit(limit);
            }
            builder
                .build()
                .map(CompiledPattern::Standard)
                .map_err(|error| error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn fancy() -> PatternEngine {
        PatternOptions::fancy_regex().into()
    }

    fn linear() -> PatternEngine {
        PatternOptions::regex().into()
    }

    #[test_case("^abc", "abcdef", true)]
    #[test_case("^abc$", "abcdef", false)]
    #[test_case(r"^\d+$", "123", true)]
    #[test_case(r"^\d+$", "١٢٣", false; "ecma digits are ascii only")]
    #[test_case("^(?!eo:)", "eo:x", false)]
    #[test_case("^(?!eo:)", "en:x", true)]
    #[test_case(r"^\cJ$", "\n", true; "control escape")]
    #[test_case(r"^\cj$", "j", false; "control escape is not a literal")]
    fn matching(pattern: &str, text: &str, expected: bool) {
        let compiled = compile(pattern, &fancy()).expect("Valid pattern");
        assert_eq!(compiled.is_match(text).expect("No backtrack limit"), expected);
    }

    #[test]
    fn literal_fast_paths() {
        assert!(matches!(
            compile("^x-", &fancy()),
            Ok(CompiledPattern::Prefix(prefix)) if prefix == "x-"
        ));
        assert!(matches!(
            compile("^v1$", &linear()),
            Ok(CompiledPattern::Exact(exact)) if exact == "v1"
        ));
    }

    #[test]
    fn linear_engine_rejects_lookaround() {
        let error = compile("^(?!eo:)", &linear()).expect_err("Should fail");
        assert!(error.contains("lookaround"));
        assert!(matches!(compile("^[a-z]+$", &linear()), Ok(CompiledPattern::Standard(_))));
    }

    #[test_case("[a-z"; "unclosed class")]
    #[test_case("(abc"; "unclosed group")]
    fn syntax_errors(pattern: &str) {
        assert!(compile(pattern, &fancy()).is_err());
        assert!(compile(pattern, &linear()).is_err());
    }
}
