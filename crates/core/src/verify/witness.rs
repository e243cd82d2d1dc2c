//! Maps a conflicting pair to the witness nodes a semantics actually
//! requires reachability between.

use crate::graph::hb::HappensBeforeGraph;
use crate::model::node::{NodeId, VerifyNode};

/// One side of a witness mapping: keep the node as-is, or walk forward
/// (`Next`) / backward (`Prev`) in program order to the first node
/// whose function is in the given set.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Offset {
    Same,
    Next(Vec<String>),
    Prev(Vec<String>),
}

impl Offset {
    fn resolve(&self, node: &VerifyNode, graph: &HappensBeforeGraph) -> Option<NodeId> {
        match self {
            Self::Same => Some(node.id()),
            Self::Next(funcs) => {
                let funcs: Vec<&str> = funcs.iter().map(String::as_str).collect();
                graph.next_po_node(node, &funcs)
            }
            Self::Prev(funcs) => {
                let funcs: Vec<&str> = funcs.iter().map(String::as_str).collect();
                graph.prev_po_node(node, &funcs)
            }
        }
    }
}

/// A user-defined `c1`/`c2` witness rule, parsed from the custom-semantics
/// DSL by `verifyio_parser` (kept out of this crate to avoid a
/// dependency on the grammar).
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomWitness {
    pub c1: Offset,
    pub c2: Offset,
}

/// Resolves the `(v1, v2)` witness pair spec.md §4.5's table describes
/// for a given semantics. Returns `None` for either side when the
/// required synchronization point does not exist, meaning the pair is
/// not properly synchronized.
pub(crate) fn resolve(
    semantics: &crate::verify::Semantics,
    algorithm: crate::verify::Algorithm,
    n1: &VerifyNode,
    n2: &VerifyNode,
    graph: &HappensBeforeGraph,
) -> Option<(NodeId, NodeId)> {
    use crate::verify::{Algorithm, Semantics};

    match semantics {
        Semantics::Posix => Some((n1.id(), n2.id())),
        Semantics::Commit => {
            let v1 = graph.next_po_node(n1, &["fsync", "close", "fclose"])?;
            Some((v1, n2.id()))
        }
        Semantics::Session => {
            let v1 = graph.next_po_node(n1, &["close", "fclose", "fsync"])?;
            let v2 = graph.prev_po_node(n2, &["open", "fopen", "fsync"])?;
            Some((v1, v2))
        }
        Semantics::MpiIo => {
            let next_sync_id = graph.next_po_node(n1, &["MPI_File_close", "MPI_File_sync"])?;
            let prev_sync = graph.prev_po_node(n2, &["MPI_File_open", "MPI_File_sync"])?;
            let v1 = if matches!(algorithm, Algorithm::OnTheFlyMpiScan) {
                next_sync_id
            } else {
                let next_sync_node = graph.node_at(next_sync_id)?;
                graph.next_po_node(next_sync_node, &[])?
            };
            Some((v1, prev_sync))
        }
        Semantics::Custom(custom) => {
            let v1 = custom.c1.resolve(n1, graph)?;
            let v2 = custom.c2.resolve(n2, graph)?;
            Some((v1, v2))
        }
    }
}
