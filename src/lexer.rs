use memchr::memchr;

/// Characters that always form a one-character token of their own.
const SEPARATORS: &[char] = &[
    ',', '+', '.', '-', '*', '\\', '=', '(', ')', '<', '>', ';', ':', '!',
];

#[inline]
fn is_separator(c: char) -> bool {
    SEPARATORS.contains(&c)
}

#[inline]
fn is_quote(c: char) -> bool {
    matches!(c, '\'' | '"' | '`')
}

/// Raw tokenizer over a single statement.
///
/// Produces contiguous substrings of the source; no token kinds are
/// assigned here. Quoted runs keep their delimiters.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    /// Byte offset of the next unread character. Always a char boundary.
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    /// Current byte offset into the source.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.source.len()
    }

    #[inline]
    fn peek_char(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Scan the next raw token. Returns `""` once the input is exhausted.
    pub fn next_raw_token(&mut self) -> &'a str {
        let source = self.source;
        let mut start: Option<usize> = None;

        while let Some(c) = self.peek_char() {
            if is_quote(c) {
                let begin = start.unwrap_or(self.pos);
                self.pos = self.scan_quoted(c);
                return &source[begin..self.pos];
            }

            if is_separator(c) {
                if let Some(s) = start {
                    // Leave the separator for the next call.
                    return &source[s..self.pos];
                }
                let s = self.pos;
                self.pos += c.len_utf8();
                return &source[s..self.pos];
            }

            if c.is_whitespace() {
                if let Some(s) = start {
                    let token = &source[s..self.pos];
                    self.pos += c.len_utf8();
                    return token;
                }
                self.skip_whitespace();
                continue;
            }

            let s = *start.get_or_insert(self.pos);
            self.pos += c.len_utf8();
            if self.peek_char().is_some_and(char::is_whitespace) {
                return &source[s..self.pos];
            }
        }

        match start {
            Some(s) => &source[s..self.pos],
            None => "",
        }
    }

    /// Returns the offset just past the closing delimiter, or the end of
    /// input when the run is unterminated.
    fn scan_quoted(&self, quote: char) -> usize {
        let body = self.pos + quote.len_utf8();
        let bytes = self.source.as_bytes();
        match memchr(quote as u8, &bytes[body..]) {
            Some(offset) => body + offset + 1,
            None => bytes.len(),
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = &'a str;

    /// Yields raw tokens until the input is exhausted. Trailing whitespace
    /// produces no final empty token.
    fn next(&mut self) -> Option<&'a str> {
        if self.is_exhausted() {
            return None;
        }
        let token = self.next_raw_token();
        if token.is_empty() && self.is_exhausted() {
            None
        } else {
            Some(token)
        }
    }
}

/// Split a statement into its raw tokens.
pub fn tokenize(source: &str) -> Vec<&str> {
    Lexer::new(source).collect()
}
