//! Ellipsis-tolerant output matching for embedded examples.
//!
//! Expected output recorded in a documentation file may contain `...` as a
//! wildcard matching any text at that position, so examples can assert on
//! output with variable parts (timestamps, paths, addresses). Expected
//! patterns are translated to anchored regexes and cached per process.

use std::collections::HashMap;
use std::sync::Mutex;

use regex::Regex;

/// The wildcard marker accepted in expected output.
pub const ELLIPSIS: &str = "...";

lazy_static::lazy_static! {
    /// Cache for compiled expected-output patterns
    static ref PATTERN_CACHE: Mutex<HashMap<String, Regex>> = Mutex::new(HashMap::new());
}

/// Translate expected output into an anchored regex pattern. Everything is
/// matched literally except `...`, which matches any text including line
/// breaks and the empty string.
pub fn translate_expected(expected: &str) -> String {
    let mut pattern = String::from("(?s)^");
    for (index, literal) in expected.split(ELLIPSIS).enumerate() {
        if index > 0 {
            pattern.push_str(".*");
        }
        pattern.push_str(&regex::escape(literal));
    }
    pattern.push('$');
    pattern
}

/// Compile an expected-output pattern, using the cache.
pub fn compile_expected(expected: &str) -> Result<Regex, regex::Error> {
    let mut cache = PATTERN_CACHE.lock().unwrap();

    if let Some(regex) = cache.get(expected) {
        return Ok(regex.clone());
    }

    let regex = Regex::new(&translate_expected(expected))?;
    cache.insert(expected.to_string(), regex.clone());

    Ok(regex)
}

/// Test actual output against expected output with ellipsis tolerance.
pub fn output_matches(expected: &str, actual: &str) -> bool {
    match compile_expected(expected) {
        Ok(regex) => regex.is_match(actual),
        // Escaped literals always compile; equality is the conservative fallback.
        Err(_) => expected == actual,
    }
}

/// Normalize program output for comparison: strip trailing whitespace from
/// every line and drop trailing blank lines.
pub fn normalize_output(text: &str) -> String {
    let mut normalized = text
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    while normalized.ends_with('\n') {
        normalized.pop();
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_escapes_literals() {
        assert_eq!(translate_expected("a+b"), r"(?s)^a\+b$");
        assert_eq!(translate_expected("x...y"), r"(?s)^x.*y$");
    }

    #[test]
    fn exact_output_matches() {
        assert!(output_matches("hello", "hello"));
        assert!(!output_matches("hello", "hello world"));
    }

    #[test]
    fn ellipsis_spans_variable_text() {
        assert!(output_matches("result: ...42", "result: computed 42"));
        assert!(output_matches("result: ...42", "result: 42"));
        assert!(!output_matches("result: ...42", "result: computed 43"));
    }

    #[test]
    fn ellipsis_at_the_edges() {
        assert!(output_matches("...done", "all steps done"));
        assert!(output_matches("start...", "start of something long"));
        assert!(output_matches("...", ""));
        assert!(output_matches("...", "anything at all"));
    }

    #[test]
    fn ellipsis_crosses_line_breaks() {
        assert!(output_matches("first...last", "first\nmiddle\nlast"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        assert!(output_matches("[ok] (2)", "[ok] (2)"));
        assert!(!output_matches("[ok]", "o"));
    }

    #[test]
    fn normalize_strips_trailing_whitespace() {
        assert_eq!(normalize_output("a  \nb\t\n\n"), "a\nb");
        assert_eq!(normalize_output(""), "");
    }
}
