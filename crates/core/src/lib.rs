//! Offline verification of parallel-I/O synchronization.
//!
//! `verifyio_core` decides whether conflicting I/O operations recorded
//! from a multi-process program execution are properly synchronized
//! under a chosen file-consistency [`Semantics`]. It does not execute or
//! simulate the traced program, and it does not detect conflicts itself
//! -- both are the responsibility of external collaborators (the
//! trace-capture runtime and the conflict detector). Given a trace
//! already split into [`model::VerifyNode`]s and a precomputed list of
//! [`model::ConflictGroup`]s, this crate:
//!
//! 1. Reconstructs cross-rank synchronization edges from the per-rank
//!    MPI call streams ([`matcher`]).
//! 2. Builds a happens-before DAG over program order and synchronization
//!    order, with ghost vertices standing in for collective fences, and
//!    (optionally) a vector clock per vertex ([`graph`]).
//! 3. For every conflict group, derives a pair of witness nodes from the
//!    chosen [`Semantics`] and decides reachability between them,
//!    counting the conflicts that are not properly synchronized
//!    ([`verify`]).
//!
//! # Entry point
//!
//! [`verify::verify_execution`] takes per-rank [`model::VerifyNode`]
//! sequences, the matched [`model::MpiEdge`]s, a list of
//! [`model::ConflictGroup`]s, and a [`verify::VerifyConfig`], and returns
//! a [`verify::Report`].
//!
//! # Crate features
//!
//! - **`serde`** -- enables `Serialize`/`Deserialize` on the wire-facing
//!   types (`Record`, `FuncTable`, `PerRankRecords`, `VerifyNode`,
//!   `MpiEdge`, `ConflictGroup`, `Semantics`, `Report`).
//! - **`schemars`** -- enables `JsonSchema` derives for the `verifyio
//!   schema` CLI subcommand.

pub mod graph;
pub mod matcher;
pub mod model;
pub mod verify;

pub use graph::{CycleError, HappensBeforeGraph};
pub use matcher::{match_mpi_calls, MatchConfig, MatchOutcome, MatchWarning};
pub use model::{extract_nodes, finalize, merge_conflict_nodes, ConflictGroup, FuncTable, MpiCall, MpiEdge, NodeId, PerRankRecords, Record, VerifyNode};
pub use verify::{verify_execution, Algorithm, CallChain, CustomWitness, Offset, Report, Semantics, VerifyConfig, Violation};
