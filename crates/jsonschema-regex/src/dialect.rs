use std::borrow::Cow;

/// Rewrite ECMA-262 shorthand classes into their ASCII-only meaning.
///
/// Rust engines treat `\d` and `\w` as Unicode-aware; ECMA-262 does not. An unescaped `[` inside
/// a character class is literal in ECMA-262 but opens a nested class in Rust. Control escapes
/// (`\cJ`) have no Rust counterpart and become hex escapes.
#[must_use]
pub fn translate(pattern: &str) -> Cow<'_, str> {
    if !pattern.contains('\\') && !pattern.contains('[') {
        return Cow::Borrowed(pattern);
    }
    let mut output = String::with_capacity(pattern.len() + 8);
    let mut in_class = false;
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('d') if in_class => output.push_str("0-9"),
                Some('d') => output.push_str("[0-9]"),
                Some('D') if !in_class => output.push_str("[^0-9]"),
                Some('w') if in_class => output.push_str("a-zA-Z0-9_"),
                Some('w') => output.push_str("[a-zA-Z0-9_]"),
                Some('W') if !in_class => output.push_str("[^a-zA-Z0-9_]"),
                Some('c') if chars.peek().is_some_and(char::is_ascii_alphabetic) => {
                    if let Some(letter) = chars.next() {
                        output.push_str(&format!("\\x{:02X}", u32::from(letter) % 32));
                    }
                }
                Some(next) => {
                    output.push('\\');
                    output.push(next);
                }
                None => output.push('\\'),
            },
            '[' if in_class => output.push_str("\\["),
            '[' => {
                in_class = true;
                output.push('[');
                // A leading `]` or `^]` is literal.
                if chars.peek() == Some(&'^') {
                    output.push('^');
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    output.push_str("\\]");
                    chars.next();
                }
            }
            ']' if in_class => {
                in_class = false;
                output.push(']');
            }
            c => output.push(c),
        }
    }
    Cow::Owned(output)
}

#[cfg(test)]
mod tests {
    use super::translate;
    use test_case::test_case;

    #[test_case("^abc$", "^abc$")]
    #[test_case(r"\d+", "[0-9]+")]
    #[test_case(r"[\d.]", "[0-9.]")]
    #[test_case(r"\w-\W", "[a-zA-Z0-9_]-[^a-zA-Z0-9_]")]
    #[test_case(r"[[a]", r"[\[a]")]
    #[test_case(r"\.\/", r"\.\/")]
    #[test_case(r"^\cJ$", r"^\x0A$"; "control escape")]
    #[test_case(r"[\ca-\cz]", r"[\x01-\x1A]"; "control escapes in class")]
    #[test_case(r"\c1", r"\c1"; "control escape without letter")]
    fn translation(pattern: &str, expected: &str) {
        assert_eq!(translate(pattern), expected);
    }
}
