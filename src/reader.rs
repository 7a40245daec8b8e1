use crate::classifier::{is_numeric_literal, is_quoted_literal, keyword_eq};
use crate::error::ExtractError;
use crate::lexer::Lexer;

/// Filters the raw token stream down to tokens the extractor cares about.
///
/// String and numeric literals are dropped, backtick-quoted identifiers are
/// unwrapped, `CONCAT(...)` disappears and `MAX(col)` becomes `col`. Holds a
/// single token of lookahead that callers can push back.
#[derive(Debug, Clone)]
pub struct TokenReader<'a> {
    lexer: Lexer<'a>,
    lookahead: Option<&'a str>,
}

impl<'a> TokenReader<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lexer: Lexer::new(source),
            lookahead: None,
        }
    }

    /// Byte offset of the underlying lexer.
    pub fn position(&self) -> usize {
        self.lexer.position()
    }

    /// Return a token to the stream; the next read yields it again.
    pub fn push_back(&mut self, token: &'a str) {
        debug_assert!(
            self.lookahead.is_none(),
            "lookahead slot already holds {:?}",
            self.lookahead
        );
        self.lookahead = Some(token);
    }

    /// Next token worth examining, or `None` at end of stream.
    ///
    /// Fails only on a malformed `MAX(...)` wrapper.
    pub fn next_valid_token(&mut self) -> Result<Option<&'a str>, ExtractError> {
        if let Some(token) = self.lookahead.take() {
            return Ok(Some(token));
        }

        loop {
            let Some(token) = self.next_surviving_token() else {
                return Ok(None);
            };
            let token = strip_backticks(token);

            if keyword_eq(token, "CONCAT") {
                self.skip_through_close_paren();
                continue;
            }
            if keyword_eq(token, "MAX") {
                return self.unwrap_max().map(Some);
            }
            return Ok(Some(token));
        }
    }

    /// Skip empty tokens, numbers and string literals.
    fn next_surviving_token(&mut self) -> Option<&'a str> {
        loop {
            let token = self.lexer.next_raw_token();
            if !token.is_empty() && !is_numeric_literal(token) && !is_quoted_literal(token) {
                return Some(token);
            }
            if self.lexer.is_exhausted() {
                return None;
            }
        }
    }

    /// Discard raw tokens up to and including the first `)`. No nesting.
    fn skip_through_close_paren(&mut self) {
        loop {
            let token = self.lexer.next_raw_token();
            if token == ")" {
                return;
            }
            if self.lexer.is_exhausted() {
                log::debug!("CONCAT without closing ')' runs to end of statement");
                return;
            }
        }
    }

    /// `MAX ( col )` yields `col`.
    fn unwrap_max(&mut self) -> Result<&'a str, ExtractError> {
        self.expect_raw('(')?;
        let column = self.lexer.next_raw_token();
        self.expect_raw(')')?;
        Ok(column)
    }

    fn expect_raw(&mut self, expected: char) -> Result<(), ExtractError> {
        let token = self.lexer.next_raw_token();
        let mut chars = token.chars();
        if chars.next() == Some(expected) && chars.next().is_none() {
            return Ok(());
        }
        Err(ExtractError::MalformedFunctionWrapper {
            position: self.lexer.position(),
            expected,
        })
    }
}

/// Remove the delimiters of a backtick-quoted identifier. Double-quoted
/// tokens never get here; they are dropped as literals.
/// An unterminated run only loses its opening delimiter.
fn strip_backticks(token: &str) -> &str {
    match token.strip_prefix('`') {
        Some(inner) => inner.strip_suffix('`').unwrap_or(inner),
        None => token,
    }
}
