//! Reconstructs cross-rank synchronization edges from per-rank MPI call
//! streams.

mod algorithm;
mod decode;
mod translate;

use crate::model::edge::MpiEdge;
use crate::model::record::{FuncTable, PerRankRecords};

pub use translate::CommTable;

/// Selects which function-name sets populate the all-to-all fence set
/// (spec.md §4.3). `false` (the default) additionally treats
/// broadcasts, gathers/reduces, file-collectives, and
/// communicator-creation calls as fences.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchConfig {
    pub mpi_sync_calls: bool,
}

/// A problem the matcher could not resolve into an edge. Matching
/// continues past every warning; the analysis proceeds with a
/// best-effort edge set (spec.md §7, "partial match warning").
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchWarning {
    UnmatchedSend { rank: u32, seq_id: u64 },
    UnmatchedRecv { rank: u32, count: usize },
    UnmatchedCollective { rank: u32, count: usize },
    MissingWaitTest { rank: u32, seq_id: u64 },
}

impl core::fmt::Display for MatchWarning {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnmatchedSend { rank, seq_id } => write!(f, "rank {rank}: unmatched send at seq_id {seq_id}"),
            Self::UnmatchedRecv { rank, count } => write!(f, "rank {rank}: {count} unmatched recv(s)"),
            Self::UnmatchedCollective { rank, count } => write!(f, "rank {rank}: {count} unmatched collective(s)"),
            Self::MissingWaitTest { rank, seq_id } => {
                write!(f, "rank {rank}: no wait/test completes request at seq_id {seq_id}")
            }
        }
    }
}

/// The result of a matching pass: the best-effort synchronization-edge
/// set plus every warning encountered along the way.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub edges: Vec<MpiEdge>,
    pub warnings: Vec<MatchWarning>,
}

/// Entry point: decodes every rank's accepted MPI calls and matches
/// them into synchronization edges.
#[must_use]
pub fn match_mpi_calls(records: &PerRankRecords, funcs: &FuncTable, config: &MatchConfig) -> MatchOutcome {
    algorithm::run(records, funcs, config)
}
