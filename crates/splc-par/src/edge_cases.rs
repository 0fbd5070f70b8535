//! Grammar-sampled acceptance tests for the SLR engine.
//!
//! A small program generator derives random SPL programs from the
//! grammar shape; every generated program must be accepted by the SLR
//! driver and by the recursive-descent AST builder, and both must agree
//! on rejection for mutated inputs.
