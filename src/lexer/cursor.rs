//! Seekable cursor over a file's tokens.

use super::Token;

/// A cursor positioned on one token of a borrowed token slice.
///
/// Mirrors an array's internal pointer: `current` reads the token under the
/// cursor and `advance` moves one step forward before reading. Once the end
/// is reached the cursor stays exhausted.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// The token under the cursor, or `None` once exhausted.
    pub fn current(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// Move to the next token and return it.
    pub fn advance(&mut self) -> Option<&'a Token> {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        self.current()
    }

    /// Advance until a token satisfies `pred`, leaving the cursor on it.
    /// Returns `None` (cursor exhausted) when no such token remains.
    pub fn advance_until<F>(&mut self, mut pred: F) -> Option<&'a Token>
    where
        F: FnMut(&Token) -> bool,
    {
        while let Some(token) = self.advance() {
            if pred(token) {
                return Some(token);
            }
        }
        None
    }

    /// Look past the cursor, skipping whitespace, without moving.
    /// Returns the position and the token found.
    pub fn peek_significant(&self) -> Option<(usize, &'a Token)> {
        self.tokens
            .iter()
            .enumerate()
            .skip(self.pos + 1)
            .find(|(_, token)| !token.is_whitespace())
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor to an absolute position (clamped to the end).
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len());
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::TokenKind;

    fn sample() -> Vec<Token> {
        vec![
            Token::classified(TokenKind::Identifier, "foo", 1),
            Token::classified(TokenKind::Whitespace, " ", 1),
            Token::Raw('('),
            Token::Raw(')'),
            Token::Raw(';'),
        ]
    }

    #[test]
    fn test_advance_and_exhaustion() {
        let tokens = sample();
        let mut cursor = TokenCursor::new(&tokens);
        assert!(cursor.current().unwrap().is_kind(TokenKind::Identifier));
        assert!(cursor.advance().unwrap().is_whitespace());
        assert!(cursor.advance_until(|t| t.is_raw(';')).is_some());
        assert_eq!(cursor.position(), 4);
        assert!(cursor.advance().is_none());
        assert!(cursor.advance().is_none());
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn test_peek_significant_skips_whitespace() {
        let tokens = sample();
        let cursor = TokenCursor::new(&tokens);
        let (pos, token) = cursor.peek_significant().unwrap();
        assert_eq!(pos, 2);
        assert!(token.is_raw('('));
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_seek_is_clamped() {
        let tokens = sample();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.seek(100);
        assert!(cursor.is_exhausted());
        cursor.seek(3);
        assert!(cursor.current().unwrap().is_raw(')'));
    }

    #[test]
    fn test_advance_until_missing_exhausts() {
        let tokens = sample();
        let mut cursor = TokenCursor::new(&tokens);
        assert!(cursor.advance_until(|t| t.is_raw('{')).is_none());
        assert!(cursor.current().is_none());
    }
}
