//! splc-sem - Semantic analysis for SPL.
//!
//! Two passes over the AST:
//!
//! 1. The **symbol table builder** creates the lexically nested scope
//!    tree (`everywhere` → `global` → `proc …`/`func …`/`main`, each
//!    routine with a nested `body` scope) and declares every name,
//!    accumulating duplicate-declaration errors.
//! 2. The **type checker** walks the tree with a scope stack, enforcing
//!    SPL's numeric/boolean discipline, scoping and arity rules. Errors
//!    accumulate into a [`Report`]; the walk never aborts, so one run
//!    surfaces every diagnostic.

pub mod check;
pub mod scope;
pub mod symbols;

pub use check::{Report, Ty, TypeChecker, TypeError};
pub use scope::{Scope, ScopeId, ScopeTree, Symbol, SymbolError, SymbolExtras, SymbolKind};
pub use symbols::SymbolTableBuilder;
