//! Verify nodes: the semantic view of a record the verifier operates on.

use core::fmt;
use core::hash::{Hash, Hasher};

/// Stable identity of a verify node: `(rank, seq_id)`.
///
/// Two [`VerifyNode`]s are equal iff they share a `NodeId`, per the
/// data-model invariant that identity does not depend on `func` or
/// `index`. A ghost vertex uses `rank == nprocs` (the synthetic ghost
/// rank) and a monotonically increasing `seq_id`.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    pub rank: u32,
    pub seq_id: u64,
}

impl NodeId {
    #[must_use]
    pub const fn new(rank: u32, seq_id: u64) -> Self {
        Self { rank, seq_id }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.rank, self.seq_id)
    }
}

/// A semantic view of a record: `(rank, seq_id, func_name, index, file_handle?)`.
///
/// `seq_id` is the record's original position in its rank's record
/// stream. `index` is this node's position in the compacted, sorted
/// per-rank verify-node sequence; it is `None` until the node extractor
/// sorts and assigns it. `file_handle` is set for MPI-file and
/// metadata-I/O calls from argument 0 of the underlying record.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone)]
pub struct VerifyNode {
    pub rank: u32,
    pub seq_id: u64,
    pub func: String,
    pub index: Option<usize>,
    pub file_handle: Option<String>,
}

impl VerifyNode {
    #[must_use]
    pub const fn new(rank: u32, seq_id: u64, func: String, file_handle: Option<String>) -> Self {
        Self {
            rank,
            seq_id,
            func,
            index: None,
            file_handle,
        }
    }

    /// The synthetic ghost vertex inserted to fence a multi-participant
    /// collective. `rank` is the real process count; `seq_id` is a
    /// monotonically increasing ghost counter shared across the graph.
    #[must_use]
    pub fn ghost(nprocs: u32, ghost_seq_id: u64) -> Self {
        Self {
            rank: nprocs,
            seq_id: ghost_seq_id,
            func: "ghost".to_string(),
            index: None,
            file_handle: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        NodeId::new(self.rank, self.seq_id)
    }

    /// The stable `"rank-seq_id-func"` graph key used for diagnostics.
    #[must_use]
    pub fn graph_key(&self) -> String {
        format!("{}-{}-{}", self.rank, self.seq_id, self.func)
    }

    #[must_use]
    pub const fn is_ghost(&self) -> bool {
        self.index.is_none() && {
            // Ghost nodes are never indexed (they don't sit in a rank's
            // program-order sequence), but ordinary unindexed nodes look
            // the same before extraction finishes, so also check `func`.
            matches!(self.func.as_bytes(), b"ghost")
        }
    }
}

impl fmt::Display for VerifyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Rank {}: {}th {}>", self.rank, self.seq_id, self.func)
    }
}

impl PartialEq for VerifyNode {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for VerifyNode {}

impl Hash for VerifyNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_func_and_index() {
        let mut a = VerifyNode::new(0, 3, "open".to_string(), None);
        let b = VerifyNode::new(0, 3, "close".to_string(), Some("7".to_string()));
        a.index = Some(1);
        assert_eq!(a, b);
    }

    #[test]
    fn test_graph_key() {
        let n = VerifyNode::new(1, 9, "MPI_Send".to_string(), None);
        assert_eq!(n.graph_key(), "1-9-MPI_Send");
    }

    #[test]
    fn test_ghost() {
        let g = VerifyNode::ghost(4, 2);
        assert_eq!(g.rank, 4);
        assert_eq!(g.seq_id, 2);
        assert_eq!(g.func, "ghost");
    }
}
