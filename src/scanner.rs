use crate::error::{ParseError, ParseErrorKind};

/// Byte cursor over an abbreviation. Every matching operation is anchored
/// at the cursor: it either consumes a prefix of the remaining input or
/// leaves the cursor untouched. Alternation is expressed by taking a
/// [`Scanner::checkpoint`], trying a branch, and restoring on failure.
pub(crate) struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Scanner { input, pos: 0 }
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The unconsumed remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    pub fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    /// Consume `s` if the remaining input starts with it.
    pub fn consume(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    pub fn consume_char(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Expect `s` at the cursor, consuming it or failing with an
    /// expected-token error.
    pub fn expect(&mut self, s: &str) -> Result<(), ParseError> {
        if self.consume(s) {
            Ok(())
        } else if self.eof() {
            Err(ParseError {
                position: self.pos,
                kind: ParseErrorKind::unexpected_eof(Some(format!("'{}'", s))),
            })
        } else {
            Err(self.error_expected(format!("'{}'", s)))
        }
    }

    /// Consume the longest prefix whose characters satisfy `pred`.
    pub fn take_while<F: Fn(char) -> bool>(&mut self, pred: F) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if pred(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    pub fn checkpoint(&self) -> usize {
        self.pos
    }

    pub fn restore(&mut self, checkpoint: usize) {
        self.pos = checkpoint;
    }

    pub fn error_expected<D: Into<String>>(&self, description: D) -> ParseError {
        ParseError {
            position: self.pos,
            kind: ParseErrorKind::Expected {
                description: description.into(),
            },
        }
    }
}
