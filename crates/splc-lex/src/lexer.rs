//! Lexer implementation.
//!
//! The lexer is single-threaded and restartable: it exposes an
//! iteration interface yielding one token per step, and a
//! [`Lexer::tokenize`] convenience that collects the whole stream. Any
//! lexical error aborts the compilation with the offending position.

use thiserror::Error;

use crate::cursor::Cursor;
use crate::token::{keyword_kind, Token, TokenKind};

/// Maximum number of characters inside a string literal.
const MAX_STRING_LEN: usize = 15;

/// A fatal lexical error with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lexing error at line {line}, col {column}: {message}")]
pub struct LexError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl LexError {
    fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Lexer for SPL source text.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer over the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Collects the full token stream, stopping at the first error.
    pub fn tokenize(source: &'a str) -> Result<Vec<Token>, LexError> {
        Lexer::new(source).collect()
    }

    /// Returns the next token, `None` at end of input, or an error.
    pub fn next_token(&mut self) -> Option<Result<Token, LexError>> {
        self.cursor.skip_whitespace();
        if self.cursor.is_at_end() {
            return None;
        }

        let line = self.cursor.line();
        let column = self.cursor.column();

        let punct = |kind: TokenKind, lexeme: &str| -> Result<Token, LexError> {
            Ok(Token::new(kind, lexeme, line, column))
        };

        let result = match self.cursor.current_char() {
            '(' => {
                self.cursor.advance();
                punct(TokenKind::LParen, "(")
            }
            ')' => {
                self.cursor.advance();
                punct(TokenKind::RParen, ")")
            }
            '{' => {
                self.cursor.advance();
                punct(TokenKind::LBrace, "{")
            }
            '}' => {
                self.cursor.advance();
                punct(TokenKind::RBrace, "}")
            }
            ';' => {
                self.cursor.advance();
                punct(TokenKind::Semi, ";")
            }
            '=' => {
                self.cursor.advance();
                punct(TokenKind::Assign, "=")
            }
            '>' => {
                self.cursor.advance();
                punct(TokenKind::Gt, ">")
            }
            '"' => self.lex_string(),
            c if c.is_ascii_digit() => self.lex_number(),
            c if c.is_ascii_lowercase() => self.lex_ident_or_keyword(),
            c => Err(LexError::new(
                format!("Unexpected character '{c}'"),
                line,
                column,
            )),
        };

        Some(result)
    }

    /// Lexes a string literal.
    ///
    /// The body may contain only letters and digits, at most
    /// [`MAX_STRING_LEN`] of them, and may not span a line break.
    fn lex_string(&mut self) -> Result<Token, LexError> {
        let start_line = self.cursor.line();
        let start_column = self.cursor.column();
        self.cursor.advance(); // consume opening quote

        let mut body = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::new(
                    "Unterminated string literal",
                    start_line,
                    start_column,
                ));
            }

            let c = self.cursor.current_char();
            if c == '"' {
                self.cursor.advance();
                break;
            }
            if c == '\n' {
                return Err(LexError::new(
                    "String literal cannot span lines",
                    self.cursor.line(),
                    self.cursor.column(),
                ));
            }
            if !c.is_ascii_alphanumeric() {
                return Err(LexError::new(
                    "Strings may contain only letters or digits",
                    self.cursor.line(),
                    self.cursor.column(),
                ));
            }
            body.push(c);
            self.cursor.advance();
        }

        if body.len() > MAX_STRING_LEN {
            return Err(LexError::new(
                format!("String literal exceeds max length {MAX_STRING_LEN}"),
                start_line,
                start_column,
            ));
        }

        Ok(Token::new(TokenKind::Str, body, start_line, start_column))
    }

    /// Lexes a number: `0`, or a nonzero digit followed by digits.
    fn lex_number(&mut self) -> Result<Token, LexError> {
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();

        if self.cursor.current_char() == '0' {
            self.cursor.advance();
            if self.cursor.current_char().is_ascii_digit() {
                return Err(LexError::new(
                    "Numbers cannot have leading zeros",
                    line,
                    column,
                ));
            }
        } else {
            while self.cursor.current_char().is_ascii_digit() {
                self.cursor.advance();
            }
        }

        Ok(Token::new(
            TokenKind::Number,
            self.cursor.slice_from(start),
            line,
            column,
        ))
    }

    /// Lexes an identifier or keyword: `[a-z][a-z0-9]*`, then a keyword
    /// table lookup.
    fn lex_ident_or_keyword(&mut self) -> Result<Token, LexError> {
        let start = self.cursor.position();
        let line = self.cursor.line();
        let column = self.cursor.column();

        self.cursor.advance();
        loop {
            let c = self.cursor.current_char();
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                self.cursor.advance();
            } else {
                break;
            }
        }

        let lexeme = self.cursor.slice_from(start);
        let kind = keyword_kind(lexeme).unwrap_or(TokenKind::Ident);
        Ok(Token::new(kind, lexeme, line, column))
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(source: &str) -> Vec<(TokenKind, String)> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.lexeme))
            .collect()
    }

    fn lex_err(source: &str) -> LexError {
        Lexer::tokenize(source).unwrap_err()
    }

    #[test]
    fn test_punctuation() {
        let got = toks("( ) { } ; = >");
        let kinds: Vec<_> = got.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::RBrace,
                TokenKind::Semi,
                TokenKind::Assign,
                TokenKind::Gt,
            ]
        );
    }

    #[test]
    fn test_keywords_vs_identifiers() {
        let got = toks("print printx plus plus9 and andy not noteq");
        assert_eq!(
            got,
            vec![
                (TokenKind::Print, "print".to_string()),
                (TokenKind::Ident, "printx".to_string()),
                (TokenKind::Plus, "plus".to_string()),
                (TokenKind::Ident, "plus9".to_string()),
                (TokenKind::And, "and".to_string()),
                (TokenKind::Ident, "andy".to_string()),
                (TokenKind::Not, "not".to_string()),
                (TokenKind::Ident, "noteq".to_string()),
            ]
        );
    }

    #[test]
    fn test_sample_program_prefix() {
        let got = toks("glob { x y }\nproc { }");
        assert_eq!(
            got,
            vec![
                (TokenKind::Glob, "glob".to_string()),
                (TokenKind::LBrace, "{".to_string()),
                (TokenKind::Ident, "x".to_string()),
                (TokenKind::Ident, "y".to_string()),
                (TokenKind::RBrace, "}".to_string()),
                (TokenKind::Proc, "proc".to_string()),
                (TokenKind::LBrace, "{".to_string()),
                (TokenKind::RBrace, "}".to_string()),
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            toks("0 7 10 123456789"),
            vec![
                (TokenKind::Number, "0".to_string()),
                (TokenKind::Number, "7".to_string()),
                (TokenKind::Number, "10".to_string()),
                (TokenKind::Number, "123456789".to_string()),
            ]
        );
    }

    #[test]
    fn test_leading_zero_rejected() {
        let err = lex_err("01");
        assert!(err.message.contains("leading zeros"));
        assert_eq!((err.line, err.column), (1, 1));
        // every 0d combination fails
        for d in '0'..='9' {
            assert!(Lexer::tokenize(&format!("0{d}")).is_err());
        }
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            toks("\"Hello123\" \"ok\""),
            vec![
                (TokenKind::Str, "Hello123".to_string()),
                (TokenKind::Str, "ok".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_bounds() {
        // 15 inner characters succeed, 16 fail
        let fifteen = "a".repeat(15);
        assert_eq!(toks(&format!("\"{fifteen}\"")), vec![(TokenKind::Str, fifteen)]);
        let sixteen = "a".repeat(16);
        let err = lex_err(&format!("\"{sixteen}\""));
        assert!(err.message.contains("max length 15"));
    }

    #[test]
    fn test_string_illegal_inner_char() {
        let err = lex_err("\"a b\"");
        assert!(err.message.contains("only letters or digits"));
    }

    #[test]
    fn test_string_spanning_lines() {
        let err = lex_err("\"ab\ncd\"");
        assert!(err.message.contains("cannot span lines"));
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex_err("\"abc");
        assert!(err.message.contains("Unterminated"));
        assert_eq!((err.line, err.column), (1, 1));
    }

    #[test]
    fn test_unexpected_character() {
        let err = lex_err("x = 1 + 2");
        assert!(err.message.contains("Unexpected character '+'"));
        assert_eq!((err.line, err.column), (1, 7));
    }

    #[test]
    fn test_uppercase_rejected() {
        let err = lex_err("Main");
        assert!(err.message.contains("Unexpected character 'M'"));
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::tokenize("glob {\n  x\n}").unwrap();
        let positions: Vec<_> = tokens.iter().map(|t| (t.line, t.column)).collect();
        assert_eq!(positions, vec![(1, 1), (1, 6), (2, 3), (3, 1)]);
    }

    #[test]
    fn test_minimal_program_token_count() {
        let tokens =
            Lexer::tokenize("glob { } proc { } func { } main { var { } halt }").unwrap();
        assert_eq!(tokens.len(), 16);
        assert_eq!(tokens.last().unwrap().kind, TokenKind::RBrace);
    }

    #[test]
    fn test_empty_input() {
        assert!(Lexer::tokenize("").unwrap().is_empty());
        assert!(Lexer::tokenize("  \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_restartable_iteration() {
        let mut lexer = Lexer::new("a b");
        let first = lexer.next_token().unwrap().unwrap();
        assert_eq!(first.lexeme, "a");
        let second = lexer.next_token().unwrap().unwrap();
        assert_eq!(second.lexeme, "b");
        assert!(lexer.next_token().is_none());
        assert!(lexer.next_token().is_none());
    }
}
