//! splc-util - Shared infrastructure for the SPL compiler.
//!
//! This crate holds the small set of types every phase crate needs:
//! source spans, per-compilation node identifiers, and the diagnostic
//! model used for user-facing error reporting.

pub mod diagnostic;
pub mod node_id;
pub mod span;

pub use diagnostic::{Diagnostic, Level, Stage};
pub use node_id::{NodeId, NodeIdGen};
pub use span::Span;
