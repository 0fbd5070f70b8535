//! Diagnostic model for user-facing error reporting.
//!
//! Every error surfaced by the compiler carries a [`Stage`] tag and,
//! where meaningful, a source [`Span`]. The driver renders one line per
//! diagnostic on stderr.

use crate::Span;

/// Diagnostic severity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// An error that fails the compilation.
    Error,
    /// A warning that does not fail the compilation.
    Warning,
    /// Additional information about a diagnostic.
    Note,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// Pipeline stage a diagnostic originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Ast,
    Symbols,
    Types,
    CodeGen,
    Resolve,
    Io,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Lex => write!(f, "lex"),
            Stage::Parse => write!(f, "parse"),
            Stage::Ast => write!(f, "ast"),
            Stage::Symbols => write!(f, "symbols"),
            Stage::Types => write!(f, "types"),
            Stage::CodeGen => write!(f, "codegen"),
            Stage::Resolve => write!(f, "resolve"),
            Stage::Io => write!(f, "io"),
        }
    }
}

/// A single diagnostic message with stage tag and optional location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub stage: Stage,
    pub message: String,
    pub span: Option<Span>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            stage,
            message: message.into(),
            span: None,
        }
    }

    /// Attach a source location.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.span {
            Some(span) => write!(
                f,
                "{}[{}]: {} ({})",
                self.level, self.stage, self.message, span
            ),
            None => write!(f, "{}[{}]: {}", self.level, self.stage, self.message),
        }
    }
}
