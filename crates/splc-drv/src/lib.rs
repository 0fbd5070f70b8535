//! splc-drv - Pipeline orchestration for the SPL compiler.
//!
//! The driver runs the phases in their fixed order:
//!
//! ```text
//! source text → lex → SLR parse (accept gate) → AST build
//!             → symbol table → type check
//!             → code generation → label resolution → BASIC text
//! ```
//!
//! Lexical, syntax and tree errors are fatal and stop the pipeline at
//! their phase. Symbol and type errors are accumulated and reported
//! together. Code generation and label resolution assume a type-clean
//! tree and cannot fail on user input. No output file is written unless
//! every phase succeeds.

use std::path::{Path, PathBuf};

use thiserror::Error;

use splc_gen::{render, resolve_labels, CodeGenerator};
use splc_lex::{LexError, Lexer};
use splc_par::{AstBuilder, AstError, ParseError, SlrParser};
use splc_sem::{SymbolError, SymbolTableBuilder, TypeChecker, TypeError};
use splc_util::{Diagnostic, Stage};

/// Compilation options.
#[derive(Debug, Clone)]
pub struct Config {
    /// Line-number step for the label resolver.
    pub step: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            step: splc_gen::resolver::DEFAULT_STEP,
        }
    }
}

/// Any failure the pipeline can surface to the user.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Ast(#[from] AstError),

    #[error("semantic analysis failed with {count} error(s)", count = .symbols.len() + .types.len())]
    Semantic {
        symbols: Vec<SymbolError>,
        types: Vec<TypeError>,
    },
}

impl CompileError {
    /// The pipeline stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            CompileError::Io { .. } => Stage::Io,
            CompileError::Lex(_) => Stage::Lex,
            CompileError::Parse(_) => Stage::Parse,
            CompileError::Ast(_) => Stage::Ast,
            CompileError::Semantic { .. } => Stage::Types,
        }
    }

    /// One diagnostic per underlying error, in stage order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            CompileError::Io { .. } => vec![Diagnostic::error(Stage::Io, self.to_string())],
            CompileError::Lex(err) => vec![Diagnostic::error(Stage::Lex, err.to_string())],
            CompileError::Parse(err) => vec![Diagnostic::error(Stage::Parse, err.to_string())],
            CompileError::Ast(err) => vec![Diagnostic::error(Stage::Ast, err.to_string())],
            CompileError::Semantic { symbols, types } => symbols
                .iter()
                .map(|e| Diagnostic::error(Stage::Symbols, e.to_string()))
                .chain(
                    types
                        .iter()
                        .map(|e| Diagnostic::error(Stage::Types, e.to_string())),
                )
                .collect(),
        }
    }
}

/// Compiles SPL source text to line-numbered BASIC.
pub fn compile_source(source: &str, config: &Config) -> Result<String, CompileError> {
    tracing::debug!("lexing");
    let tokens = Lexer::tokenize(source)?;
    tracing::debug!(tokens = tokens.len(), "lexed");

    tracing::debug!("parsing");
    let parser = SlrParser::spl();
    parser.parse(&tokens)?;

    tracing::debug!("building syntax tree");
    let ast = AstBuilder::build(&tokens)?;
    tracing::trace!(tree = %ast.pretty(), "syntax tree");

    tracing::debug!("building symbol table");
    let (mut scopes, symbol_errors) = SymbolTableBuilder::build(&ast);
    tracing::trace!(scopes = %scopes.pretty(), "symbol table");

    tracing::debug!("type checking");
    let report = TypeChecker::check(&ast, &mut scopes);
    if !symbol_errors.is_empty() || !report.ok() {
        return Err(CompileError::Semantic {
            symbols: symbol_errors,
            types: report.into_errors(),
        });
    }

    tracing::debug!("generating code");
    let instrs = CodeGenerator::generate_program(&ast, &scopes);
    let lines = render(&instrs);

    tracing::debug!(lines = lines.len(), "resolving labels");
    Ok(resolve_labels(&lines, config.step))
}

/// Compiles an SPL source file into a `.bas` file. The output file is
/// only written when compilation succeeds.
pub fn compile_file(input: &Path, output: &Path, config: &Config) -> Result<(), CompileError> {
    let source = std::fs::read_to_string(input).map_err(|source| CompileError::Io {
        path: input.to_path_buf(),
        source,
    })?;

    let basic = compile_source(&source, config)?;

    std::fs::write(output, basic).map_err(|source| CompileError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    Ok(())
}
