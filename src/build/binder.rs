//! Binding of documentation blocks to the declaration that follows them.

use crate::lexer::{Token, TokenKind};

/// Holds the most recent doc comment until it is claimed or invalidated.
///
/// A doc comment binds to the next `class` / `function` keyword only if
/// nothing but whitespace sits between them.
#[derive(Debug, Default)]
pub struct CommentBinder {
    pending: Option<String>,
}

impl CommentBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a token that is not a declaration keyword.
    pub fn observe(&mut self, token: &Token) {
        match token {
            Token::Classified {
                kind: TokenKind::DocComment,
                text,
                ..
            } => self.pending = Some(text.clone()),
            Token::Classified {
                kind: TokenKind::Whitespace,
                ..
            } => {}
            _ => self.pending = None,
        }
    }

    /// Claim the pending block, leaving the binder empty.
    pub fn take(&mut self) -> Option<String> {
        self.pending.take()
    }
}
