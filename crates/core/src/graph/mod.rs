//! The happens-before graph: generic digraph primitives plus the
//! domain-specific construction and query layer built on top of them.

pub mod digraph;
pub mod hb;

pub use digraph::DiGraph;
pub use hb::{CycleError, HappensBeforeGraph};
