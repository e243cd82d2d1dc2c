//! The happens-before DAG: program order plus synchronization order,
//! with ghost vertices fencing multi-participant collectives.

use hashbrown::HashMap;

use crate::graph::digraph::DiGraph;
use crate::model::edge::MpiEdge;
use crate::model::node::{NodeId, VerifyNode};

/// Trace inconsistency: the synchronization edges the matcher produced,
/// combined with each rank's program order, form a cycle. This can only
/// happen on a malformed or buggy trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError(pub NodeId, pub NodeId);

impl core::fmt::Display for CycleError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "happens-before graph contains a cycle: {} -> {}", self.0, self.1)
    }
}

impl std::error::Error for CycleError {}

/// Program-order-plus-synchronization-order DAG over [`NodeId`]s, with
/// optional precomputed vector clocks.
pub struct HappensBeforeGraph {
    graph: DiGraph<NodeId>,
    nodes: Vec<Vec<VerifyNode>>,
    nprocs: u32,
    vector_clocks: Option<HashMap<NodeId, Vec<u64>>>,
}

impl HappensBeforeGraph {
    /// Builds the graph from each rank's ordered verify-node list and
    /// the matched synchronization edges. `with_vector_clocks`
    /// additionally runs the topological-order vector clock pass.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError`] if the resulting graph is not a DAG.
    pub fn build(
        nodes: Vec<Vec<VerifyNode>>,
        edges: &[MpiEdge],
        with_vector_clocks: bool,
    ) -> Result<Self, CycleError> {
        #[allow(clippy::cast_possible_truncation)]
        let nprocs = nodes.len() as u32;
        let mut graph = DiGraph::default();

        for rank_nodes in &nodes {
            for n in rank_nodes {
                graph.add_vertex(n.id());
            }
            for w in rank_nodes.windows(2) {
                graph.add_edge(w[0].id(), w[1].id());
            }
        }

        let mut next_ghost_seq: u64 = 0;
        for edge in edges {
            match edge {
                MpiEdge::PointToPoint { from, to } => graph.add_edge(*from, *to),
                MpiEdge::AllToAll { participants }
                | MpiEdge::OneToMany { participants, .. }
                | MpiEdge::ManyToOne { participants, .. } => {
                    let mut all = participants.clone();
                    if let MpiEdge::OneToMany { root, .. } | MpiEdge::ManyToOne { root, .. } = edge {
                        all.push(*root);
                    }
                    if all.len() > 1 {
                        let ghost = NodeId::new(nprocs, next_ghost_seq);
                        next_ghost_seq += 1;
                        graph.add_vertex(ghost);
                        for p in &all {
                            if let Some(successors) = graph.neighbors(p).cloned() {
                                for s in &successors {
                                    graph.add_edge(ghost, *s);
                                }
                                graph.adj_map.insert(*p, Default::default());
                            }
                            graph.add_edge(*p, ghost);
                        }
                    }
                }
            }
        }

        if let Some((from, to)) = graph.find_cycle_edge() {
            return Err(CycleError(from, to));
        }

        let vector_clocks = if with_vector_clocks {
            Some(Self::compute_vector_clocks(&graph, nprocs))
        } else {
            None
        };

        Ok(Self {
            graph,
            nodes,
            nprocs,
            vector_clocks,
        })
    }

    fn compute_vector_clocks(graph: &DiGraph<NodeId>, nprocs: u32) -> HashMap<NodeId, Vec<u64>> {
        let len = nprocs as usize + 1;

        let mut preds: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for (src, dsts) in &graph.adj_map {
            for dst in dsts {
                preds.entry(*dst).or_default().push(*src);
            }
        }

        let order = graph.topological_sort().unwrap_or_default();
        let mut result: HashMap<NodeId, Vec<u64>> = HashMap::new();
        for v in order {
            let mut clock = vec![0u64; len];
            clock[v.rank as usize] = v.seq_id;
            if let Some(ps) = preds.get(&v) {
                for u in ps {
                    if let Some(pred_clock) = result.get(u) {
                        let mut bumped = pred_clock.clone();
                        bumped[u.rank as usize] += 1;
                        for i in 0..len {
                            clock[i] = clock[i].max(bumped[i]);
                        }
                    }
                }
            }
            result.insert(v, clock);
        }
        result
    }

    #[must_use]
    pub fn nprocs(&self) -> u32 {
        self.nprocs
    }

    #[must_use]
    pub fn has_path(&self, src: NodeId, dst: NodeId) -> bool {
        self.graph.has_path(&src, &dst)
    }

    #[must_use]
    pub fn shortest_path(&self, src: NodeId, dst: NodeId) -> Option<Vec<NodeId>> {
        self.graph.shortest_path(&src, &dst)
    }

    #[must_use]
    pub fn get_vector_clock(&self, node: NodeId) -> Option<&[u64]> {
        self.vector_clocks.as_ref().and_then(|vc| vc.get(&node)).map(Vec::as_slice)
    }

    /// The rank's verify nodes in index order, for callers (the
    /// on-the-fly MPI scan decision algorithm) that need to walk
    /// program order directly rather than through `next_po_node`.
    #[must_use]
    pub fn rank_nodes(&self, rank: u32) -> Option<&[VerifyNode]> {
        self.nodes.get(rank as usize).map(Vec::as_slice)
    }

    /// Scans `nodes[n.rank]` from `n.index + 1` upward for the first
    /// node whose `func` is in `funcs`, or the immediate next node if
    /// `funcs` is empty.
    #[must_use]
    pub fn next_po_node(&self, n: &VerifyNode, funcs: &[&str]) -> Option<NodeId> {
        let rank_nodes = self.rank_nodes(n.rank)?;
        let start = n.index?.checked_add(1)?;
        if funcs.is_empty() {
            return rank_nodes.get(start).map(VerifyNode::id);
        }
        rank_nodes[start..].iter().find(|c| funcs.contains(&c.func.as_str())).map(VerifyNode::id)
    }

    /// Symmetric to [`Self::next_po_node`], scanning backward from
    /// `n.index - 1`.
    #[must_use]
    pub fn prev_po_node(&self, n: &VerifyNode, funcs: &[&str]) -> Option<NodeId> {
        let rank_nodes = self.rank_nodes(n.rank)?;
        let idx = n.index?;
        if idx == 0 {
            return None;
        }
        if funcs.is_empty() {
            return rank_nodes.get(idx - 1).map(VerifyNode::id);
        }
        rank_nodes[..idx].iter().rev().find(|c| funcs.contains(&c.func.as_str())).map(VerifyNode::id)
    }

    #[must_use]
    pub fn node_at(&self, id: NodeId) -> Option<&VerifyNode> {
        self.rank_nodes(id.rank)?.iter().find(|n| n.seq_id == id.seq_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(rank: u32, seq_id: u64, func: &str, index: usize) -> VerifyNode {
        let mut n = VerifyNode::new(rank, seq_id, func.to_string(), None);
        n.index = Some(index);
        n
    }

    #[test]
    fn test_program_order_only() {
        let nodes = vec![vec![node(0, 0, "MPI_Send", 0), node(0, 1, "MPI_Recv", 1)]];
        let g = HappensBeforeGraph::build(nodes, &[], false).unwrap();
        assert!(g.has_path(NodeId::new(0, 0), NodeId::new(0, 1)));
        assert!(!g.has_path(NodeId::new(0, 1), NodeId::new(0, 0)));
    }

    #[test]
    fn test_point_to_point_cross_rank() {
        let nodes = vec![
            vec![node(0, 0, "MPI_Send", 0)],
            vec![node(1, 0, "MPI_Recv", 0)],
        ];
        let edges = vec![MpiEdge::PointToPoint {
            from: NodeId::new(0, 0),
            to: NodeId::new(1, 0),
        }];
        let g = HappensBeforeGraph::build(nodes, &edges, false).unwrap();
        assert!(g.has_path(NodeId::new(0, 0), NodeId::new(1, 0)));
    }

    #[test]
    fn test_collective_ghost_joins_participants() {
        let nodes = vec![
            vec![node(0, 0, "MPI_Barrier", 0), node(0, 1, "MPI_Send", 1)],
            vec![node(1, 0, "MPI_Barrier", 0)],
        ];
        let edges = vec![MpiEdge::AllToAll {
            participants: vec![NodeId::new(0, 0), NodeId::new(1, 0)],
        }];
        let g = HappensBeforeGraph::build(nodes, &edges, false).unwrap();
        assert!(g.has_path(NodeId::new(1, 0), NodeId::new(0, 1)));
    }

    #[test]
    fn test_vector_clock_monotonic_on_program_order() {
        let nodes = vec![vec![node(0, 0, "a", 0), node(0, 1, "b", 1), node(0, 2, "c", 2)]];
        let g = HappensBeforeGraph::build(nodes, &[], true).unwrap();
        let vc0 = g.get_vector_clock(NodeId::new(0, 0)).unwrap();
        let vc2 = g.get_vector_clock(NodeId::new(0, 2)).unwrap();
        assert!(vc0[0] < vc2[0]);
    }

    #[test]
    fn test_next_prev_po_node() {
        let nodes = vec![vec![
            node(0, 0, "open", 0),
            node(0, 1, "MPI_Send", 1),
            node(0, 2, "close", 2),
        ]];
        let g = HappensBeforeGraph::build(nodes, &[], false).unwrap();
        let n1 = g.node_at(NodeId::new(0, 1)).unwrap().clone();
        assert_eq!(g.next_po_node(&n1, &["close"]), Some(NodeId::new(0, 2)));
        assert_eq!(g.prev_po_node(&n1, &["open"]), Some(NodeId::new(0, 0)));
    }

    #[test]
    fn test_cycle_detected() {
        let nodes = vec![vec![node(0, 0, "a", 0), node(0, 1, "b", 1)], vec![node(1, 0, "c", 0)]];
        let edges = vec![
            MpiEdge::PointToPoint {
                from: NodeId::new(0, 1),
                to: NodeId::new(1, 0),
            },
            MpiEdge::PointToPoint {
                from: NodeId::new(1, 0),
                to: NodeId::new(0, 0),
            },
        ];
        assert!(HappensBeforeGraph::build(nodes, &edges, false).is_err());
    }
}
