//! Interpolation token scanning.
//!
//! Stored translation strings may embed references to other keys:
//! - `${key}` is a live reference that must be resolved,
//! - `$${key}` is an escaped reference rendered as the literal `${key}`,
//! - everything else is plain text.
//!
//! A `${` with no closing `}` matches neither form and stays literal text.

use std::sync::LazyLock;

use regex::Regex;

/// Matches `$${key}` (escaped, capture 1 present) or `${key}` (live).
/// Capture 3 is the reference key text, any non-`}` run.
static INTERPOLATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\$)?(\$\{([^}]+)\})").unwrap());

/// One segment of a scanned string.
///
/// Concatenating the source text of all tokens reconstructs the input
/// exactly; references keep their original spelling until rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A run of plain text.
    Literal(&'a str),
    /// A `${key}` or `$${key}` occurrence.
    Reference { key: &'a str, escaped: bool },
}

impl Token<'_> {
    /// Whether this token is a reference that needs resolution.
    pub fn is_live_reference(&self) -> bool {
        matches!(self, Token::Reference { escaped: false, .. })
    }
}

/// Split `input` into literal and reference tokens.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last_end = 0;

    for caps in INTERPOLATION_REGEX.captures_iter(input) {
        let matched = caps.get(0).unwrap();
        if matched.start() > last_end {
            tokens.push(Token::Literal(&input[last_end..matched.start()]));
        }
        tokens.push(Token::Reference {
            key: caps.get(3).unwrap().as_str(),
            escaped: caps.get(1).is_some(),
        });
        last_end = matched.end();
    }

    if last_end < input.len() {
        tokens.push(Token::Literal(&input[last_end..]));
    }

    tokens
}
