//! Skipping of declaration bodies by brace depth.

use crate::lexer::{Token, TokenCursor};

/// How a token affects brace depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceClass {
    Open,
    Close,
    /// `{$` / `${` in a string: opens a level closed by a plain `}`
    ImplicitOpen,
    Neutral,
}

pub fn classify(token: &Token) -> BraceClass {
    match token {
        Token::Raw('{') => BraceClass::Open,
        Token::Raw('}') => BraceClass::Close,
        Token::Classified { kind, .. } if kind.opens_implicit_brace() => BraceClass::ImplicitOpen,
        _ => BraceClass::Neutral,
    }
}

/// Result of skipping a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipOutcome {
    /// The cursor rests on the body's closing `}`
    Closed,
    /// The stream ended first
    Truncated,
}

/// Advance past a declaration body.
///
/// Starts with the token after the cursor and stops on the `}` that brings
/// the depth back to zero. A `}` seen before any opening brace also ends the
/// skip.
pub fn skip_body(cursor: &mut TokenCursor<'_>) -> SkipOutcome {
    let mut depth = 0usize;
    while let Some(token) = cursor.advance() {
        match classify(token) {
            BraceClass::Open | BraceClass::ImplicitOpen => depth += 1,
            BraceClass::Close => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return SkipOutcome::Closed;
                }
            }
            BraceClass::Neutral => {}
        }
    }
    SkipOutcome::Truncated
}
