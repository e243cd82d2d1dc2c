//! Synchronization-order edges produced by matching MPI calls across ranks.

use crate::model::node::NodeId;

/// One synchronization-order relationship discovered by
/// [`crate::matcher::match_mpi_calls`], to be added to the
/// happens-before graph alongside each rank's program order.
///
/// `PointToPoint` connects a send-side node directly to a recv-side
/// node. The collective variants instead connect every participant
/// through a single ghost vertex (spec.md's one-ghost-per-collective
/// resolution -- see `SPEC_FULL.md` §9), so they carry the full
/// participant list rather than a pair.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MpiEdge {
    /// A matched send/recv pair: `from` happens-before `to`.
    PointToPoint { from: NodeId, to: NodeId },
    /// A collective where every rank in `participants` both sends to
    /// and receives from the fence (`MPI_Barrier`, `MPI_Allreduce`,
    /// `MPI_Allgather`, `MPI_Alltoall`).
    AllToAll { participants: Vec<NodeId> },
    /// A collective with one distinguished root that all other
    /// participants synchronize through (`MPI_Bcast`, `MPI_Scatter`).
    OneToMany { root: NodeId, participants: Vec<NodeId> },
    /// A collective where all participants feed a single root
    /// (`MPI_Gather`, `MPI_Reduce`).
    ManyToOne { root: NodeId, participants: Vec<NodeId> },
}

impl MpiEdge {
    /// Every node this edge touches, in no particular order.
    #[must_use]
    pub fn get_all_involved_calls(&self) -> Vec<NodeId> {
        match self {
            Self::PointToPoint { from, to } => vec![*from, *to],
            Self::AllToAll { participants } => participants.clone(),
            Self::OneToMany { root, participants } | Self::ManyToOne { root, participants } => {
                let mut v = Vec::with_capacity(participants.len() + 1);
                v.push(*root);
                v.extend(participants.iter().copied());
                v
            }
        }
    }

    #[must_use]
    pub const fn is_point_to_point(&self) -> bool {
        matches!(self, Self::PointToPoint { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_to_point_involved() {
        let e = MpiEdge::PointToPoint {
            from: NodeId::new(0, 1),
            to: NodeId::new(1, 2),
        };
        assert_eq!(e.get_all_involved_calls(), vec![NodeId::new(0, 1), NodeId::new(1, 2)]);
    }

    #[test]
    fn test_one_to_many_includes_root_first() {
        let e = MpiEdge::OneToMany {
            root: NodeId::new(0, 0),
            participants: vec![NodeId::new(1, 0), NodeId::new(2, 0)],
        };
        let all = e.get_all_involved_calls();
        assert_eq!(all[0], NodeId::new(0, 0));
        assert_eq!(all.len(), 3);
    }
}
