//! Call-site scanning over a client file's tokens.

use serde::Serialize;

use crate::lexer::{Token, TokenCursor, TokenKind};

/// A bare identifier immediately followed by `(`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSite {
    pub name: String,
    pub line: usize,
}

impl CallSite {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
        }
    }
}

/// Find every call-like use of a bare identifier in `tokens`.
///
/// A function definition's own name is never reported: on `function` the
/// scan jumps to the parameter list. After a call is found the rest of the
/// statement up to `;` is skipped, so arguments are not scanned separately.
/// Input that ends mid-statement stops the scan with what was found so far.
pub fn scan_call_sites(tokens: &[Token]) -> Vec<CallSite> {
    let mut cursor = TokenCursor::new(tokens);
    let mut sites = Vec::new();

    while let Some(token) = cursor.current() {
        match token {
            Token::Classified {
                kind: TokenKind::Function,
                ..
            } => {
                if cursor.advance_until(|t| t.is_raw('(')).is_none() {
                    break;
                }
            }
            Token::Classified {
                kind: TokenKind::Identifier,
                text,
                line,
            } => {
                if let Some((pos, next)) = cursor.peek_significant() {
                    if next.is_raw('(') {
                        sites.push(CallSite::new(text.as_str(), *line));
                        cursor.seek(pos);
                        if cursor.advance_until(|t| t.is_raw(';')).is_none() {
                            break;
                        }
                    }
                }
            }
            _ => {}
        }
        cursor.advance();
    }

    sites
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{PhpTokenizer, Tokenizer};

    fn scan(source: &str) -> Vec<CallSite> {
        let tokens = PhpTokenizer.tokenize(source).unwrap();
        scan_call_sites(&tokens)
    }

    #[test]
    fn test_definition_name_is_not_a_call() {
        let sites = scan("<?php\nfunction foo() {}\nfoo();\n");
        assert_eq!(sites, vec![CallSite::new("foo", 3)]);
    }

    #[test]
    fn test_whitespace_before_paren_is_skipped() {
        let sites = scan("<?php\nalpha ();\nbeta\n\t(1);\n");
        assert_eq!(sites, vec![CallSite::new("alpha", 2), CallSite::new("beta", 3)]);
    }

    #[test]
    fn test_rest_of_statement_is_consumed() {
        let sites = scan("<?php\n$x = outer(inner(1), 'a;b');\nnext_call();\n");
        assert_eq!(
            sites,
            vec![CallSite::new("outer", 2), CallSite::new("next_call", 3)]
        );
    }

    #[test]
    fn test_non_calls_are_ignored() {
        let sites = scan(
            "<?php\n$o->method(); Foo::bar(); \\ns\\helper(); echo CONSTANT;\nif (x()) {}\n",
        );
        assert_eq!(sites, vec![CallSite::new("x", 3)]);
    }

    #[test]
    fn test_repeated_calls_keep_each_line() {
        let sites = scan("<?php\nalpha(); beta(); alpha();\n");
        let names: Vec<&str> = sites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "alpha"]);
        assert!(sites.iter().all(|s| s.line == 2));
    }

    #[test]
    fn test_anonymous_function_and_truncation() {
        let sites = scan("<?php\n$f = function ($a) { return wrap($a); };\nlast(");
        assert_eq!(sites, vec![CallSite::new("wrap", 2), CallSite::new("last", 3)]);
        assert!(scan("<?php function").is_empty());
    }
}
