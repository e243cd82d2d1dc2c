//! Conflict groups: the input a verify pass decides synchronization for.

use crate::model::node::NodeId;

/// A conflicting write (or write/read) `c1` against one or more other
/// operations `c2s`, as produced by an external conflict detector. The
/// verifier never discovers conflicts itself -- it only decides, for
/// each `(c1, c2)` pair, whether a happens-before edge properly
/// synchronizes them under the chosen [`crate::verify::Semantics`].
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictGroup {
    pub c1: NodeId,
    pub c2s: Vec<NodeId>,
}

impl ConflictGroup {
    #[must_use]
    pub const fn new(c1: NodeId, c2s: Vec<NodeId>) -> Self {
        Self { c1, c2s }
    }

    #[must_use]
    pub fn pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.c2s.iter().map(move |&c2| (self.c1, c2))
    }
}
