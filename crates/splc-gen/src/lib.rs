//! splc-gen - Code generation for SPL.
//!
//! The back half of the pipeline:
//!
//! 1. [`CodeGenerator`] walks the type-checked AST and emits an ordered
//!    sequence of labeled pseudo-BASIC [`Instr`] lines for MAIN's
//!    algorithm. Procedure and function bodies compile to opaque
//!    `CALL <name>` markers.
//! 2. [`resolve_labels`] numbers the rendered lines and rewrites label
//!    references into line numbers, producing the final BASIC text.

pub mod codegen;
pub mod ir;
pub mod resolver;

pub use codegen::CodeGenerator;
pub use ir::{render, Instr};
pub use resolver::resolve_labels;
