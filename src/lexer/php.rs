//! PHP tokenizer.
//!
//! Produces the token shapes the scanners rely on: `{$` and `${` inside
//! interpolated strings become `CurlyOpen` / `DollarOpenCurlyBraces` and the
//! code embedded in them is tokenized normally up to its closing raw `}`.
//! Single-character punctuation is emitted as `Token::Raw`.

use super::{LexError, Token, TokenKind, TokenStream, Tokenizer};

/// Reserved words that are never plain identifiers.
const RESERVED: &[&str] = &[
    "__class__", "__dir__", "__file__", "__function__", "__halt_compiler", "__line__",
    "__method__", "__namespace__", "__trait__", "abstract", "and", "array", "as", "break",
    "callable", "case", "catch", "clone", "const", "continue", "declare", "default", "die", "do",
    "echo", "else", "elseif", "empty", "enddeclare", "endfor", "endforeach", "endif",
    "endswitch", "endwhile", "enum", "eval", "exit", "extends", "final", "finally", "fn", "for",
    "foreach", "global", "goto", "if", "implements", "include", "include_once", "instanceof",
    "insteadof", "interface", "isset", "list", "match", "namespace", "new", "or", "print",
    "private", "protected", "public", "readonly", "require", "require_once", "return", "static",
    "switch", "throw", "trait", "try", "unset", "use", "var", "while", "xor", "yield",
];

/// Multi-character operators, longest first.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "**=", "...", "<=>", "===", "!==", "??=", "?->", "<<", ">>", "**", "->", "=>",
    "::", "==", "!=", "<>", "<=", ">=", "&&", "||", "??", "++", "--", "+=", "-=", "*=", "/=",
    ".=", "%=", "&=", "|=", "^=",
];

/// Operators after which a name refers to a member, not a free function.
const MEMBER_OPERATORS: &[&str] = &["->", "?->", "::"];

/// Tokenizer for PHP source files.
pub struct PhpTokenizer;

impl Tokenizer for PhpTokenizer {
    fn tokenize_stream(&self, source: &str) -> Result<TokenStream, LexError> {
        Ok(Lexer::new(source).run())
    }

    fn language(&self) -> &str {
        "php"
    }
}

fn factory() -> Box<dyn Tokenizer> {
    Box::new(PhpTokenizer)
}

/// Register the PHP tokenizer for its file extensions.
pub fn register() {
    for ext in [".php", ".inc", ".phtml"] {
        super::register(ext, factory);
    }
}

/// What a single code-mode lexing step produced.
enum Step {
    Token,
    Raw(char),
    CloseTag,
    Eof,
}

/// Where an interpolated string body ends.
enum Terminator {
    Quote(u8),
    Heredoc(String),
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b >= 0x80
}

fn is_ident_char(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

struct Lexer<'s> {
    src: &'s str,
    bytes: &'s [u8],
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
    unterminated: Option<LexError>,
}

impl<'s> Lexer<'s> {
    fn new(src: &'s str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
            unterminated: None,
        }
    }

    fn run(mut self) -> TokenStream {
        while self.pos < self.bytes.len() {
            if !self.lex_inline_html() {
                break;
            }
            loop {
                match self.lex_code_token(false) {
                    Step::CloseTag | Step::Eof => break,
                    Step::Token | Step::Raw(_) => {}
                }
            }
        }
        TokenStream {
            tokens: self.tokens,
            unterminated: self.unterminated,
        }
    }

    /// Note that the input ended inside a construct. The innermost one,
    /// reported first, is kept.
    fn mark_unterminated(&mut self, error: LexError) {
        self.unterminated.get_or_insert(error);
    }

    /// Push everything from `start` to the end of input as one token.
    fn push_tail(&mut self, kind: TokenKind, start: usize, error: LexError) {
        self.mark_unterminated(error);
        self.push(kind, start, self.bytes.len());
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    /// Push a classified token covering `start..end` and move past it.
    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        let text = &self.src[start..end];
        self.tokens.push(Token::classified(kind, text, self.line));
        self.line += text.bytes().filter(|&b| b == b'\n').count();
        self.pos = end;
    }

    fn push_raw(&mut self, c: char) {
        self.tokens.push(Token::Raw(c));
        self.pos += c.len_utf8();
    }

    /// Length of an open tag at `at`, including one trailing newline or space.
    fn open_tag_len(&self, at: usize) -> Option<usize> {
        let rest = &self.bytes[at..];
        if rest.starts_with(b"<?=") {
            return Some(3);
        }
        if rest.len() >= 5 && rest[..5].eq_ignore_ascii_case(b"<?php") {
            return match rest.get(5) {
                None => Some(5),
                Some(b'\r') if rest.get(6) == Some(&b'\n') => Some(7),
                Some(b) if b.is_ascii_whitespace() => Some(6),
                Some(_) => None,
            };
        }
        None
    }

    /// Consume text up to and including the next open tag.
    /// Returns false when the input ends without one.
    fn lex_inline_html(&mut self) -> bool {
        let mut search = self.pos;
        while let Some(offset) = self.src[search..].find("<?") {
            let at = search + offset;
            if let Some(len) = self.open_tag_len(at) {
                if at > self.pos {
                    self.push(TokenKind::InlineHtml, self.pos, at);
                }
                self.push(TokenKind::OpenTag, at, at + len);
                return true;
            }
            search = at + 2;
        }
        if self.pos < self.bytes.len() {
            self.push(TokenKind::InlineHtml, self.pos, self.bytes.len());
        }
        false
    }

    /// Lex one token in code mode. Inside string interpolation (`embedded`)
    /// a `?>` is not treated as a close tag.
    fn lex_code_token(&mut self, embedded: bool) -> Step {
        let Some(b) = self.peek(0) else {
            return Step::Eof;
        };
        let start = self.pos;

        match b {
            b' ' | b'\t' | b'\r' | b'\n' => {
                let mut end = start;
                while matches!(self.bytes.get(end), Some(b' ' | b'\t' | b'\r' | b'\n')) {
                    end += 1;
                }
                self.push(TokenKind::Whitespace, start, end);
            }
            b'?' if !embedded && self.starts_with("?>") => {
                let mut end = start + 2;
                if self.bytes.get(end) == Some(&b'\n') {
                    end += 1;
                } else if self.bytes[end..].starts_with(b"\r\n") {
                    end += 2;
                }
                self.push(TokenKind::CloseTag, start, end);
                return Step::CloseTag;
            }
            b'#' if self.starts_with("#[") => self.push(TokenKind::Operator, start, start + 2),
            b'#' => self.lex_line_comment(embedded),
            b'/' if self.starts_with("//") => self.lex_line_comment(embedded),
            b'/' if self.starts_with("/*") => self.lex_block_comment(),
            b'$' if self.peek(1).is_some_and(is_ident_start) => self.lex_variable(),
            b'\\' if self.peek(1).is_some_and(is_ident_start) => self.lex_name(),
            _ if is_ident_start(b) => self.lex_name(),
            b'0'..=b'9' => self.lex_number(),
            b'.' if self.peek(1).is_some_and(|d| d.is_ascii_digit()) => self.lex_number(),
            b'\'' => self.lex_single_quoted(),
            b'"' | b'`' => self.lex_double_quoted(b),
            b'<' if self.starts_with("<<<") && self.heredoc_header().is_some() => {
                self.lex_heredoc()
            }
            _ => {
                if let Some(op) = OPERATORS.iter().find(|op| self.starts_with(op)) {
                    self.push(TokenKind::Operator, start, start + op.len());
                } else {
                    let c = self.src[start..].chars().next().unwrap_or('\0');
                    self.push_raw(c);
                    return Step::Raw(c);
                }
            }
        }

        Step::Token
    }

    fn lex_line_comment(&mut self, embedded: bool) {
        let start = self.pos;
        let mut end = start;
        while let Some(&b) = self.bytes.get(end) {
            if b == b'\n' || (!embedded && self.bytes[end..].starts_with(b"?>")) {
                break;
            }
            end += 1;
        }
        self.push(TokenKind::Comment, start, end);
    }

    fn lex_block_comment(&mut self) {
        let start = self.pos;
        let Some(close) = self.src[start + 2..].find("*/") else {
            // never bound to a declaration, even when it opened with `/**`
            let line = self.line;
            self.push_tail(TokenKind::Comment, start, LexError::UnterminatedComment(line));
            return;
        };
        let end = start + 2 + close + 2;
        let is_doc = self.starts_with("/**")
            && self
                .bytes
                .get(start + 3)
                .is_some_and(|b| b.is_ascii_whitespace());
        let kind = if is_doc {
            TokenKind::DocComment
        } else {
            TokenKind::Comment
        };
        self.push(kind, start, end);
    }

    fn ident_end(&self, from: usize) -> usize {
        let mut end = from;
        while self.bytes.get(end).is_some_and(|&b| is_ident_char(b)) {
            end += 1;
        }
        end
    }

    fn lex_variable(&mut self) {
        let start = self.pos;
        let end = self.ident_end(start + 1);
        self.push(TokenKind::Variable, start, end);
    }

    fn lex_name(&mut self) {
        let start = self.pos;
        let mut end = start;
        loop {
            match self.bytes.get(end) {
                Some(&b) if is_ident_char(b) => end += 1,
                Some(b'\\') if self.bytes.get(end + 1).is_some_and(|&b| is_ident_start(b)) => {
                    end += 1
                }
                _ => break,
            }
        }
        let text = &self.src[start..end];
        let kind = if text.contains('\\') {
            TokenKind::QualifiedName
        } else {
            self.classify_name(text)
        };
        self.push(kind, start, end);
    }

    fn classify_name(&self, text: &str) -> TokenKind {
        if self.follows_member_operator() {
            return TokenKind::MemberName;
        }
        let lower = text.to_ascii_lowercase();
        match lower.as_str() {
            // `new class` is an anonymous class, `use function` an import
            "class" if self.follows_keyword("new") => TokenKind::Keyword,
            "class" => TokenKind::Class,
            "function" if self.follows_keyword("use") => TokenKind::Keyword,
            "function" => TokenKind::Function,
            _ if RESERVED.contains(&lower.as_str()) => TokenKind::Keyword,
            _ => TokenKind::Identifier,
        }
    }

    /// Last token that is not whitespace or a comment.
    fn previous_significant(&self) -> Option<&Token> {
        self.tokens.iter().rev().find(|t| {
            !matches!(
                t.kind(),
                Some(TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment)
            )
        })
    }

    fn follows_member_operator(&self) -> bool {
        matches!(
            self.previous_significant(),
            Some(Token::Classified { kind: TokenKind::Operator, text, .. })
                if MEMBER_OPERATORS.contains(&text.as_str())
        )
    }

    fn follows_keyword(&self, keyword: &str) -> bool {
        matches!(
            self.previous_significant(),
            Some(Token::Classified { kind: TokenKind::Keyword, text, .. })
                if text.eq_ignore_ascii_case(keyword)
        )
    }

    fn lex_number(&mut self) {
        let start = self.pos;
        let is_hex = self.starts_with("0x") || self.starts_with("0X");
        let mut end = start;
        let mut seen_dot = false;
        loop {
            match self.bytes.get(end) {
                Some(&b) if b.is_ascii_alphanumeric() || b == b'_' => end += 1,
                Some(b'.')
                    if !seen_dot
                        && (end == start
                            || self.bytes.get(end + 1).is_some_and(|d| d.is_ascii_digit())) =>
                {
                    seen_dot = true;
                    end += 1;
                }
                Some(b'+' | b'-')
                    if !is_hex
                        && end > start
                        && matches!(self.bytes[end - 1], b'e' | b'E')
                        && self.bytes.get(end + 1).is_some_and(|d| d.is_ascii_digit()) =>
                {
                    end += 1
                }
                _ => break,
            }
        }
        self.push(TokenKind::Literal, start, end);
    }

    fn lex_single_quoted(&mut self) {
        let start = self.pos;
        let mut end = start + 1;
        loop {
            match self.bytes.get(end) {
                None => {
                    let line = self.line;
                    self.push_tail(TokenKind::Literal, start, LexError::UnterminatedString(line));
                    return;
                }
                Some(b'\\') => end += 2,
                Some(b'\'') => break,
                Some(_) => end += 1,
            }
        }
        self.push(TokenKind::Literal, start, end + 1);
    }

    /// Find the end of a double-quoted string starting at the cursor and
    /// whether it contains any interpolation. `None` if it never closes.
    fn scan_double_quoted(&self, quote: u8) -> Option<(usize, bool)> {
        let mut i = self.pos + 1;
        let mut interpolated = false;
        loop {
            match self.bytes.get(i) {
                None => return None,
                Some(b'\\') => i += 2,
                Some(&b) if b == quote => return Some((i + 1, interpolated)),
                Some(b'$') => {
                    if self
                        .bytes
                        .get(i + 1)
                        .is_some_and(|&n| is_ident_start(n) || n == b'{')
                    {
                        interpolated = true;
                    }
                    i += 1;
                }
                Some(b'{') => {
                    if self.bytes.get(i + 1) == Some(&b'$') {
                        interpolated = true;
                    }
                    i += 1;
                }
                Some(_) => i += 1,
            }
        }
    }

    fn lex_double_quoted(&mut self, quote: u8) {
        let start = self.pos;
        let start_line = self.line;
        let Some((end, interpolated)) = self.scan_double_quoted(quote) else {
            self.push_tail(TokenKind::Literal, start, LexError::UnterminatedString(start_line));
            return;
        };
        if !interpolated {
            self.push(TokenKind::Literal, start, end);
            return;
        }
        self.push_raw(quote as char);
        if self.lex_encapsed(&Terminator::Quote(quote), start_line) {
            self.push_raw(quote as char);
        }
    }

    /// Parse a heredoc/nowdoc header at the cursor.
    /// Returns (body start, identifier, is_nowdoc).
    fn heredoc_header(&self) -> Option<(usize, String, bool)> {
        let mut i = self.pos + 3;
        while matches!(self.bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        let quote = match self.bytes.get(i) {
            Some(&q @ (b'\'' | b'"')) => {
                i += 1;
                Some(q)
            }
            _ => None,
        };
        if !self.bytes.get(i).is_some_and(|&b| is_ident_start(b)) {
            return None;
        }
        let id_end = self.ident_end(i);
        let id = self.src[i..id_end].to_string();
        let mut j = id_end;
        if let Some(q) = quote {
            if self.bytes.get(j) != Some(&q) {
                return None;
            }
            j += 1;
        }
        if self.bytes[j..].starts_with(b"\r\n") {
            j += 2;
        } else if self.bytes.get(j) == Some(&b'\n') {
            j += 1;
        } else {
            return None;
        }
        Some((j, id, quote == Some(b'\'')))
    }

    /// If a closing heredoc marker for `id` starts the line at `at`,
    /// return the offset just past it.
    fn heredoc_close_at(&self, at: usize, id: &str) -> Option<usize> {
        if at > 0 && self.bytes.get(at - 1) != Some(&b'\n') {
            return None;
        }
        let mut j = at;
        while matches!(self.bytes.get(j), Some(b' ' | b'\t')) {
            j += 1;
        }
        if !self.bytes[j..].starts_with(id.as_bytes()) {
            return None;
        }
        let end = j + id.len();
        match self.bytes.get(end) {
            Some(&b) if is_ident_char(b) => None,
            _ => Some(end),
        }
    }

    fn lex_heredoc(&mut self) {
        let start = self.pos;
        let start_line = self.line;
        let Some((body, id, nowdoc)) = self.heredoc_header() else {
            return;
        };

        if nowdoc {
            let close = (body..=self.bytes.len()).find_map(|at| self.heredoc_close_at(at, &id));
            match close {
                Some(end) => self.push(TokenKind::Literal, start, end),
                None => self.push_tail(
                    TokenKind::Literal,
                    start,
                    LexError::UnterminatedHeredoc(start_line),
                ),
            }
            return;
        }

        self.push(TokenKind::Literal, start, body);
        if !self.lex_encapsed(&Terminator::Heredoc(id.clone()), start_line) {
            return;
        }
        let close_start = self.pos;
        if let Some(end) = self.heredoc_close_at(close_start, &id) {
            self.push(TokenKind::Literal, close_start, end);
        }
    }

    fn flush_text(&mut self, text_start: usize) {
        if self.pos > text_start {
            let end = self.pos;
            self.pos = text_start;
            self.push(TokenKind::EncapsedText, text_start, end);
        }
    }

    /// Lex an interpolated string body, stopping in front of its terminator.
    /// Returns false when the input ends first.
    fn lex_encapsed(&mut self, term: &Terminator, start_line: usize) -> bool {
        let mut text_start = self.pos;
        loop {
            if let Terminator::Heredoc(id) = term {
                if self.heredoc_close_at(self.pos, id).is_some() {
                    self.flush_text(text_start);
                    return true;
                }
            }
            let Some(b) = self.peek(0) else {
                self.flush_text(text_start);
                self.mark_unterminated(match term {
                    Terminator::Quote(_) => LexError::UnterminatedString(start_line),
                    Terminator::Heredoc(_) => LexError::UnterminatedHeredoc(start_line),
                });
                return false;
            };
            match b {
                b'\\' => self.pos = (self.pos + 2).min(self.bytes.len()),
                _ if matches!(term, Terminator::Quote(q) if *q == b) => {
                    self.flush_text(text_start);
                    return true;
                }
                b'$' if self.peek(1).is_some_and(is_ident_start) => {
                    self.flush_text(text_start);
                    self.lex_simple_interpolation();
                    text_start = self.pos;
                }
                b'{' if self.peek(1) == Some(b'$') => {
                    self.flush_text(text_start);
                    let line = self.line;
                    self.push(TokenKind::CurlyOpen, self.pos, self.pos + 1);
                    if !self.lex_embedded_code(line) {
                        return false;
                    }
                    text_start = self.pos;
                }
                b'$' if self.peek(1) == Some(b'{') => {
                    self.flush_text(text_start);
                    let line = self.line;
                    self.push(TokenKind::DollarOpenCurlyBraces, self.pos, self.pos + 2);
                    let name_end = self.ident_end(self.pos);
                    if name_end > self.pos && matches!(self.bytes.get(name_end), Some(b'[' | b'}'))
                    {
                        self.push(TokenKind::StringVarname, self.pos, name_end);
                    }
                    if !self.lex_embedded_code(line) {
                        return false;
                    }
                    text_start = self.pos;
                }
                _ => self.pos += 1,
            }
        }
    }

    /// `$name`, `$name[key]` or `$name->prop` inside a string.
    fn lex_simple_interpolation(&mut self) {
        self.lex_variable();
        if self.peek(0) == Some(b'[') {
            self.push_raw('[');
            let start = self.pos;
            match self.peek(0) {
                Some(b'$') if self.peek(1).is_some_and(is_ident_start) => self.lex_variable(),
                Some(b) if is_ident_char(b) || b == b'-' => {
                    let end = self.ident_end(start + 1);
                    self.push(TokenKind::Literal, start, end);
                }
                _ => {}
            }
            if self.peek(0) == Some(b']') {
                self.push_raw(']');
            }
        } else {
            let op_len = if self.starts_with("?->") {
                3
            } else if self.starts_with("->") {
                2
            } else {
                0
            };
            if op_len > 0 && self.peek(op_len).is_some_and(is_ident_start) {
                let start = self.pos;
                self.push(TokenKind::Operator, start, start + op_len);
                let name_end = self.ident_end(self.pos);
                self.push(TokenKind::MemberName, self.pos, name_end);
            }
        }
    }

    /// Tokenize the code inside `{$ ... }` / `${ ... }` through its closing `}`.
    /// Returns false when the input ends first.
    fn lex_embedded_code(&mut self, start_line: usize) -> bool {
        let mut depth = 0usize;
        loop {
            match self.lex_code_token(true) {
                Step::Raw('{') => depth += 1,
                Step::Raw('}') => {
                    if depth == 0 {
                        return true;
                    }
                    depth -= 1;
                }
                Step::Eof => {
                    self.mark_unterminated(LexError::UnterminatedInterpolation(start_line));
                    return false;
                }
                Step::Token | Step::Raw(_) | Step::CloseTag => {}
            }
        }
    }
}
