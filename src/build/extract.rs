//! Extraction of documented class and function declarations.

use crate::lexer::{Token, TokenCursor, TokenKind};

use super::binder::CommentBinder;
use super::braces::{skip_body, SkipOutcome};
use super::tags::parse_version_tags;
use super::{DeclarationRecord, EntityKind, FileDeclarations};

/// Extract every documented top-level declaration from a token stream.
///
/// Class bodies are skipped whole, so methods are never recorded. Named
/// functions are recorded wherever they appear; anonymous functions are
/// ignored. A stream that ends mid-declaration keeps the records found so
/// far and sets `truncated`.
pub fn extract_declarations(tokens: &[Token], file: &str) -> FileDeclarations {
    DeclarationScan::new(tokens, file).run()
}

/// State for one extraction pass over one file.
struct DeclarationScan<'a> {
    cursor: TokenCursor<'a>,
    binder: CommentBinder,
    file: &'a str,
    records: Vec<DeclarationRecord>,
}

impl<'a> DeclarationScan<'a> {
    fn new(tokens: &'a [Token], file: &'a str) -> Self {
        Self {
            cursor: TokenCursor::new(tokens),
            binder: CommentBinder::new(),
            file,
            records: Vec::new(),
        }
    }

    fn run(mut self) -> FileDeclarations {
        let mut truncated = false;

        while let Some(token) = self.cursor.current() {
            let complete = match token.kind() {
                Some(TokenKind::Class) => self.extract_class(),
                Some(TokenKind::Function) => self.extract_function(),
                _ => {
                    self.binder.observe(token);
                    true
                }
            };
            if !complete {
                truncated = true;
                break;
            }
            self.cursor.advance();
        }

        FileDeclarations {
            records: self.records,
            truncated,
        }
    }

    /// Returns false if the stream ended before the class body closed.
    fn extract_class(&mut self) -> bool {
        let Some(name) = self
            .cursor
            .advance_until(|t| t.is_kind(TokenKind::Identifier))
        else {
            return false;
        };
        self.bind(EntityKind::Class, name);

        skip_body(&mut self.cursor) == SkipOutcome::Closed
    }

    /// Returns false if the stream ended before a name or parameter list.
    fn extract_function(&mut self) -> bool {
        let found = self
            .cursor
            .advance_until(|t| t.is_kind(TokenKind::Identifier) || t.is_raw('('));

        match found {
            None => false,
            // Anonymous function
            Some(token) if token.is_raw('(') => true,
            Some(name) => {
                self.bind(EntityKind::Function, name);
                true
            }
        }
    }

    /// Record the declaration named by `name` if a doc block is pending.
    fn bind(&mut self, kind: EntityKind, name: &Token) {
        let Some(doc) = self.binder.take() else {
            return;
        };
        let Token::Classified { text, line, .. } = name else {
            return;
        };

        let tags = parse_version_tags(&doc);
        self.records.push(DeclarationRecord {
            name: text.clone(),
            kind,
            file: self.file.to_string(),
            line: *line,
            since: tags.since,
            deprecated: tags.deprecated,
        });
    }
}
