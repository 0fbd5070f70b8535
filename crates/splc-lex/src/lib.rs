//! splc-lex - Lexical analysis for SPL.
//!
//! The lexer turns SPL source text into a stream of [`Token`]s. SPL's
//! lexical surface is small and fully ASCII:
//!
//! - punctuation: `( ) { } ; = >`
//! - identifiers: `[a-z][a-z0-9]*`, minus the keyword table
//! - numbers: `0` or `[1-9][0-9]*` (no leading zeros)
//! - strings: double-quoted, letters and digits only, at most 15
//!   characters, single line
//! - keywords: the fixed word list in [`TokenKind`]
//!
//! Whitespace separates tokens and never appears inside one. Lexical
//! errors are fatal to the compilation and carry the offending
//! position.

pub mod cursor;
mod edge_cases;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::{LexError, Lexer};
pub use token::{keyword_kind, Token, TokenKind, KEYWORDS};
