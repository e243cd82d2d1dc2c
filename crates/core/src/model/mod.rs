//! Data types shared by the matcher, graph, and verify passes.

pub mod accepted;
pub mod conflict;
pub mod edge;
pub mod extract;
pub mod mpi_call;
pub mod node;
pub mod record;

pub use conflict::ConflictGroup;
pub use edge::MpiEdge;
pub use extract::{extract_nodes, finalize, merge_conflict_nodes};
pub use mpi_call::{MpiCall, ANY_SOURCE, ANY_TAG};
pub use node::{NodeId, VerifyNode};
pub use record::{FuncTable, PerRankRecords, Record};
