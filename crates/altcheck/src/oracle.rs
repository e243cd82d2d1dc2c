//! A from-scratch happens-before reachability oracle.
//!
//! Builds its own adjacency map directly from `VerifyNode` program order
//! and `MpiEdge` synchronization edges (independent of
//! `verifyio_core::graph`'s `DiGraph`/`HappensBeforeGraph` types and BFS
//! routines), then answers reachability by fixed-point closure instead of
//! per-query BFS. Used only to cross-check `verifyio_core`'s own
//! algorithms against a second, differently-written implementation of
//! the same happens-before relation.

use hashbrown::{HashMap, HashSet};
use verifyio_core::{MpiEdge, NodeId, VerifyNode};

pub struct ReachabilityOracle {
    closure: HashMap<NodeId, HashSet<NodeId>>,
}

impl ReachabilityOracle {
    /// Rebuilds the happens-before adjacency from scratch (program order
    /// per rank, plus ghost-fenced synchronization edges per spec.md
    /// §4.4) and computes its full transitive closure.
    #[must_use]
    pub fn build(nodes: &[Vec<VerifyNode>], edges: &[MpiEdge]) -> Self {
        let adjacency = rebuild_adjacency(nodes, edges);
        let closure = transitive_closure(&adjacency);
        Self { closure }
    }

    #[must_use]
    pub fn is_reachable(&self, from: NodeId, to: NodeId) -> bool {
        from == to || self.closure.get(&from).is_some_and(|reached| reached.contains(&to))
    }
}

fn rebuild_adjacency(nodes: &[Vec<VerifyNode>], edges: &[MpiEdge]) -> HashMap<NodeId, HashSet<NodeId>> {
    #[allow(clippy::cast_possible_truncation)]
    let nprocs = nodes.len() as u32;
    let mut adj: HashMap<NodeId, HashSet<NodeId>> = HashMap::new();

    for rank_nodes in nodes {
        for n in rank_nodes {
            adj.entry(n.id()).or_default();
        }
        for pair in rank_nodes.windows(2) {
            adj.entry(pair[0].id()).or_default().insert(pair[1].id());
        }
    }

    let mut next_ghost_seq = 0u64;
    for edge in edges {
        let participants = match edge {
            MpiEdge::PointToPoint { from, to } => {
                adj.entry(*from).or_default().insert(*to);
                continue;
            }
            MpiEdge::AllToAll { participants } => participants.clone(),
            MpiEdge::OneToMany { root, participants } | MpiEdge::ManyToOne { root, participants } => {
                let mut all = participants.clone();
                all.push(*root);
                all
            }
        };
        if participants.len() <= 1 {
            continue;
        }

        let ghost = NodeId::new(nprocs, next_ghost_seq);
        next_ghost_seq += 1;
        adj.entry(ghost).or_default();

        for p in &participants {
            if let Some(successors) = adj.get(p).cloned() {
                adj.entry(ghost).or_default().extend(successors);
                adj.insert(*p, HashSet::new());
            }
            adj.entry(*p).or_default().insert(ghost);
        }
    }

    adj
}

/// Fixed-point closure: repeatedly folds each vertex's neighbors'
/// reachable sets into its own, until nothing changes.
fn transitive_closure(adjacency: &HashMap<NodeId, HashSet<NodeId>>) -> HashMap<NodeId, HashSet<NodeId>> {
    let mut reach = adjacency.clone();
    loop {
        let mut changed = false;
        let vertices: Vec<NodeId> = reach.keys().copied().collect();
        for v in vertices {
            let to_add: Vec<NodeId> = reach[&v]
                .iter()
                .flat_map(|mid| reach.get(mid).into_iter().flatten().copied())
                .filter(|w| !reach[&v].contains(w))
                .collect();
            if !to_add.is_empty() {
                changed = true;
                reach.get_mut(&v).unwrap().extend(to_add);
            }
        }
        if !changed {
            break;
        }
    }
    reach
}
