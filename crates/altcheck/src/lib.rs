//! Cross-checks `verifyio_core`'s happens-before reachability against an
//! independently implemented oracle.
//!
//! `verifyio_core::verify::Algorithm` has four nominal variants, but
//! `TransitiveClosure` always falls back to `VectorClock` (spec.md), so
//! there are really only three distinct code paths: graph BFS, vector
//! clocks, and the on-the-fly MPI scan. [`oracle::ReachabilityOracle`]
//! is a from-scratch fourth implementation that exists solely to catch
//! a bug shared by all three.

pub mod oracle;

pub use oracle::ReachabilityOracle;
