//! Tokenizer interface feeding the declaration and call-site scanners.
//!
//! This module provides:
//! - `Token`: a classified token (kind, text, line) or a raw punctuation character
//! - `TokenCursor`: a seekable cursor over one file's tokens
//! - `Tokenizer` trait plus a registry keyed by file extension
//! - `PhpTokenizer`: the concrete tokenizer for PHP sources

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use thiserror::Error;

mod cursor;
pub mod php;

pub use cursor::TokenCursor;
pub use php::PhpTokenizer;

/// Token classes produced by a tokenizer.
///
/// The scanners only look at `Class`, `Function`, `DocComment`, `Whitespace`,
/// `Identifier`, `CurlyOpen` and `DollarOpenCurlyBraces`. Everything else is
/// informational and handled uniformly as "some other token".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// The `class` keyword
    Class,
    /// The `function` keyword
    Function,
    /// A `/** ... */` documentation block
    DocComment,
    /// A `//`, `#` or `/* ... */` comment
    Comment,
    Whitespace,
    /// A bare, unqualified name
    Identifier,
    /// `{$` inside an interpolated string (the token text is `{`)
    CurlyOpen,
    /// `${` inside an interpolated string
    DollarOpenCurlyBraces,
    /// `$name`
    Variable,
    /// Reserved word other than `class` / `function`
    Keyword,
    /// Number or non-interpolated string
    Literal,
    /// Multi-character operator such as `->`, `::` or `===`
    Operator,
    /// Namespaced name (`Foo\bar`, `\bar`)
    QualifiedName,
    /// Name following `->`, `?->` or `::`
    MemberName,
    /// Text outside of `<?php ... ?>`
    InlineHtml,
    OpenTag,
    CloseTag,
    /// Variable name directly after `${` in a string
    StringVarname,
    /// Literal text between interpolations
    EncapsedText,
}

impl TokenKind {
    /// Whether this token opens an implicit brace level closed by a later raw `}`.
    pub fn opens_implicit_brace(&self) -> bool {
        matches!(self, TokenKind::CurlyOpen | TokenKind::DollarOpenCurlyBraces)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Class => "class",
            TokenKind::Function => "function",
            TokenKind::DocComment => "doc_comment",
            TokenKind::Comment => "comment",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Identifier => "identifier",
            TokenKind::CurlyOpen => "curly_open",
            TokenKind::DollarOpenCurlyBraces => "dollar_open_curly_braces",
            TokenKind::Variable => "variable",
            TokenKind::Keyword => "keyword",
            TokenKind::Literal => "literal",
            TokenKind::Operator => "operator",
            TokenKind::QualifiedName => "qualified_name",
            TokenKind::MemberName => "member_name",
            TokenKind::InlineHtml => "inline_html",
            TokenKind::OpenTag => "open_tag",
            TokenKind::CloseTag => "close_tag",
            TokenKind::StringVarname => "string_varname",
            TokenKind::EncapsedText => "encapsed_text",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A token with a kind and a 1-based line number
    Classified {
        kind: TokenKind,
        text: String,
        line: usize,
    },
    /// Bare single-character punctuation such as `{`, `}`, `(` or `;`
    Raw(char),
}

impl Token {
    pub fn classified(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Token::Classified {
            kind,
            text: text.into(),
            line,
        }
    }

    /// The token kind, or `None` for raw punctuation.
    pub fn kind(&self) -> Option<TokenKind> {
        match self {
            Token::Classified { kind, .. } => Some(*kind),
            Token::Raw(_) => None,
        }
    }

    pub fn is_kind(&self, expected: TokenKind) -> bool {
        self.kind() == Some(expected)
    }

    /// Whether this is the raw punctuation token `c`.
    pub fn is_raw(&self, c: char) -> bool {
        matches!(self, Token::Raw(r) if *r == c)
    }

    pub fn is_whitespace(&self) -> bool {
        self.is_kind(TokenKind::Whitespace)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Classified { kind, text, line } => write!(f, "LINE: {} {}: {}", line, kind, text),
            Token::Raw(c) => write!(f, "RAW: {}", c),
        }
    }
}

/// Problems found while tokenizing.
///
/// A tokenizer returns one as `Err` only when it cannot produce a token
/// stream at all. Input that merely ends inside a construct is reported
/// through `TokenStream::unterminated` instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unterminated comment starting on line {0}")]
    UnterminatedComment(usize),
    #[error("unterminated string starting on line {0}")]
    UnterminatedString(usize),
    #[error("unterminated heredoc starting on line {0}")]
    UnterminatedHeredoc(usize),
    #[error("unterminated string interpolation starting on line {0}")]
    UnterminatedInterpolation(usize),
}

/// Tokens of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    /// Set when the input ended inside a comment, string or interpolation.
    /// The unfinished construct runs to the end of input as the last token.
    pub unterminated: Option<LexError>,
}

/// Tokenizer trait for turning source text into a token stream.
pub trait Tokenizer: Send + Sync {
    /// Tokenize a whole source file.
    fn tokenize_stream(&self, source: &str) -> Result<TokenStream, LexError>;

    /// Return the language this tokenizer handles (e.g., "php").
    fn language(&self) -> &str;

    /// Tokenize a whole source file, ignoring how it ended.
    fn tokenize(&self, source: &str) -> Result<Vec<Token>, LexError> {
        Ok(self.tokenize_stream(source)?.tokens)
    }

    /// Tokenize raw bytes. Invalid UTF-8 sequences are replaced with U+FFFD.
    fn tokenize_bytes(&self, source: &[u8]) -> Result<TokenStream, LexError> {
        self.tokenize_stream(&String::from_utf8_lossy(source))
    }
}

/// Factory function type for creating tokenizer instances.
pub type TokenizerFactory = fn() -> Box<dyn Tokenizer>;

lazy_static::lazy_static! {
    /// Global tokenizer registry mapping file extensions to factories.
    static ref REGISTRY: RwLock<HashMap<String, TokenizerFactory>> = RwLock::new(HashMap::new());
}

/// Register a tokenizer factory for a file extension.
/// Extension should include the dot (e.g., ".php").
pub fn register(ext: &str, factory: TokenizerFactory) {
    if let Ok(mut registry) = REGISTRY.write() {
        registry.insert(ext.to_ascii_lowercase(), factory);
    }
}

/// Get a tokenizer for the given file extension.
/// Returns None if no tokenizer is registered for the extension.
pub fn for_extension(ext: &str) -> Option<Box<dyn Tokenizer>> {
    let registry = REGISTRY.read().ok()?;
    registry
        .get(&ext.to_ascii_lowercase())
        .map(|factory| factory())
}

/// Return all registered file extensions.
pub fn supported_extensions() -> Vec<String> {
    match REGISTRY.read() {
        Ok(registry) => {
            let mut exts: Vec<String> = registry.keys().cloned().collect();
            exts.sort();
            exts
        }
        Err(_) => Vec::new(),
    }
}

/// Initialize the registry with the built-in tokenizers.
/// Call this once at startup before looking tokenizers up.
pub fn init() {
    php::register();
}
