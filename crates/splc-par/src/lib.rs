//! splc-par - Syntax analysis for SPL.
//!
//! This crate holds both halves of the front end's syntax story:
//!
//! 1. A table-driven **SLR(1) engine**: [`Grammar`] describes the
//!    productions, [`FirstFollow`] computes the FIRST/FOLLOW sets,
//!    [`Collection`] builds the canonical LR(0) item sets, [`Tables`]
//!    derives ACTION/GOTO (shift wins over reduce, reduce–reduce is a
//!    construction error), and [`SlrParser`] runs the shift-reduce loop
//!    over the token stream, producing a concrete parse tree as the
//!    accept signal.
//! 2. The **AST builder**: a recursive-descent walk over the same token
//!    stream the SLR gate validated, producing the typed, identified
//!    [`AstNode`] tree every later phase consumes.
//!
//! The SLR driver matches tokens by their normalized terminal string
//! (`IDENT`/`NUMBER`/`STRING` or the lexeme itself); see
//! `splc_lex::Token::terminal`.

pub mod ast;
pub mod builder;
pub mod driver;
mod edge_cases;
pub mod first_follow;
pub mod grammar;
pub mod items;
pub mod table;

pub use ast::{AstNode, NodeKind};
pub use builder::{AstBuilder, AstError};
pub use driver::{ParseError, ParseNode, SlrParser};
pub use first_follow::FirstFollow;
pub use grammar::{Grammar, AUGMENTED_START, END_MARKER};
pub use items::{Collection, Item};
pub use table::{Action, Conflict, TableError, Tables};
