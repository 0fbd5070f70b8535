//! Edge case and property tests for splc-lex.

#[cfg(test)]
mod tests {
    use crate::{Lexer, TokenKind, KEYWORDS};

    fn lex_kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_single_char_ident() {
        assert_eq!(lex_kinds("x"), vec![TokenKind::Ident]);
    }

    #[test]
    fn test_edge_long_identifier() {
        let name = "a".repeat(10000);
        let tokens = Lexer::tokenize(&name).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].lexeme, name);
    }

    #[test]
    fn test_edge_ident_with_digits() {
        let tokens = Lexer::tokenize("a1 abc123 b2c3").unwrap();
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Ident));
    }

    #[test]
    fn test_edge_digits_cannot_start_ident() {
        // "1a" lexes as NUMBER(1) then IDENT(a)
        assert_eq!(lex_kinds("1a"), vec![TokenKind::Number, TokenKind::Ident]);
    }

    #[test]
    fn test_edge_adjacent_punctuation() {
        assert_eq!(
            lex_kinds("(){};=>"),
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
    fn test_edge_empty_string_literal() {
        let tokens = Lexer::tokenize("\"\"").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Str);
        assert_eq!(tokens[0].lexeme, "");
    }

    #[test]
    fn test_edge_string_with_uppercase() {
        // uppercase letters are letters, allowed inside strings
        let tokens = Lexer::tokenize("\"HelloWorld\"").unwrap();
        assert_eq!(tokens[0].lexeme, "HelloWorld");
    }

    #[test]
    fn test_edge_keyword_at_eof() {
        assert_eq!(lex_kinds("halt"), vec![TokenKind::Halt]);
    }

    #[test]
    fn test_edge_error_position_inside_input() {
        // lexer total function: failure positions fall inside the input
        for src in ["@", "ab @", "\"x!\"", "0  09"] {
            let err = Lexer::tokenize(src).unwrap_err();
            assert!(err.line >= 1);
            assert!(err.column >= 1);
            assert!(((err.column - 1) as usize) < src.len());
        }
    }

    // ==================== PROPERTIES ====================

    mod props {
        use super::*;
        use proptest::prelude::*;

        /// Identifier-shaped lexemes: [a-z][a-z0-9]{0,11}
        fn ident_strategy() -> impl Strategy<Value = String> {
            ("[a-z]", "[a-z0-9]{0,11}").prop_map(|(head, tail)| format!("{head}{tail}"))
        }

        proptest! {
            /// Keyword determinism: an identifier-shaped lexeme lexes to
            /// a keyword kind iff it is in the keyword table.
            #[test]
            fn keyword_iff_in_table(word in ident_strategy()) {
                let tokens = Lexer::tokenize(&word).unwrap();
                prop_assert_eq!(tokens.len(), 1);
                let in_table = KEYWORDS.iter().any(|(kw, _)| *kw == word);
                prop_assert_eq!(tokens[0].kind == TokenKind::Ident, !in_table);
                prop_assert_eq!(&tokens[0].lexeme, &word);
            }

            /// Numbers without leading zeros lex to a single NUMBER
            /// token whose lexeme round-trips the value.
            #[test]
            fn numbers_lex_exactly(n in 0u64..1_000_000_000) {
                let src = n.to_string();
                let tokens = Lexer::tokenize(&src).unwrap();
                prop_assert_eq!(tokens.len(), 1);
                prop_assert_eq!(tokens[0].kind, TokenKind::Number);
                prop_assert_eq!(&tokens[0].lexeme, &src);
            }

            /// Multi-digit numbers starting with zero always fail.
            #[test]
            fn leading_zero_always_fails(n in 0u64..100_000) {
                let src = format!("0{n}");
                prop_assert!(Lexer::tokenize(&src).is_err());
            }

            /// Alphanumeric strings of length <= 15 always lex; the
            /// token stream never loses the body.
            #[test]
            fn short_strings_lex(body in "[a-zA-Z0-9]{0,15}") {
                let src = format!("\"{body}\"");
                let tokens = Lexer::tokenize(&src).unwrap();
                prop_assert_eq!(tokens.len(), 1);
                prop_assert_eq!(&tokens[0].lexeme, &body);
            }

            /// Whitespace between tokens never changes the kinds.
            #[test]
            fn whitespace_insensitive(pad in "[ \t\n]{0,5}") {
                let src = format!("glob{pad} {{ x }}");
                let kinds = lex_kinds(&src);
                prop_assert_eq!(
                    kinds,
                    vec![
                        TokenKind::Glob,
                        TokenKind::LBrace,
                        TokenKind::Ident,
                        TokenKind::RBrace,
                    ]
                );
            }
        }
    }
}
