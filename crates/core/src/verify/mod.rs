//! Decides, per conflict group, whether conflicting I/O operations are
//! properly synchronized under a chosen file-consistency semantics.

mod callchain;
mod witness;

use hashbrown::HashMap;

use crate::graph::hb::HappensBeforeGraph;
use crate::model::conflict::ConflictGroup;
use crate::model::edge::MpiEdge;
use crate::model::node::{NodeId, VerifyNode};
use crate::model::record::{FuncTable, PerRankRecords};

pub use callchain::{build_call_chain, CallChain};
pub use witness::{CustomWitness, Offset};

/// File-consistency semantics a conflicting pair is checked against.
/// See spec.md §4.5 for the witness-node mapping each variant uses.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Semantics {
    Posix,
    Commit,
    Session,
    MpiIo,
    Custom(CustomWitness),
}

/// Decision algorithm used to test reachability between witness nodes.
/// `TransitiveClosure` is accepted for compatibility but is always
/// evaluated as `VectorClock` (spec.md: "not recommended; fall through
/// to algorithm 3").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    GraphReachability,
    TransitiveClosure,
    VectorClock,
    OnTheFlyMpiScan,
}

impl Algorithm {
    #[must_use]
    pub const fn from_u8(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::GraphReachability),
            2 => Some(Self::TransitiveClosure),
            3 => Some(Self::VectorClock),
            4 => Some(Self::OnTheFlyMpiScan),
            _ => None,
        }
    }
}

/// Tunables for a verification run.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    pub semantics: Semantics,
    pub algorithm: Algorithm,
    /// Scan `[seq_id - lock_window, seq_id + lock_window]` on `n1`'s
    /// rank for `fcntl`/`flock` before deciding a pair; present for any
    /// hit treats the pair as properly synchronized. spec.md calls this
    /// a conservative placeholder, not a real lock analysis.
    pub lock_window: u64,
    pub show_details: bool,
    /// Walk the full call chain down to the top-level call for each
    /// violation's `Violation::n1_chain`/`n2_chain` instead of the
    /// de-duplicated per-depth partial chain.
    pub show_call_chain: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            semantics: Semantics::MpiIo,
            algorithm: Algorithm::VectorClock,
            lock_window: 5,
            show_details: false,
            show_call_chain: false,
        }
    }
}

/// One conflicting pair found not properly synchronized.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone)]
pub struct Violation {
    pub n1: NodeId,
    pub n2: NodeId,
    pub file: Option<String>,
    pub n1_chain: Option<CallChain>,
    pub n2_chain: Option<CallChain>,
}

/// The outcome of verifying an entire execution's conflict groups.
#[cfg_attr(feature = "serde", derive(::serde::Serialize, ::serde::Deserialize))]
#[cfg_attr(feature = "schemars", derive(::schemars::JsonSchema))]
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub total_conflicts: u64,
    pub total_violations: u64,
    pub violations: Vec<Violation>,
}

/// Sparse `rank -> seq_id -> target_rank -> target_node` map built from
/// every collective edge's full participant list, used only by
/// algorithm 4 (on-the-fly MPI scan).
struct MappedEdges {
    map: HashMap<NodeId, HashMap<u32, NodeId>>,
}

impl MappedEdges {
    fn build(edges: &[MpiEdge]) -> Self {
        let mut map: HashMap<NodeId, HashMap<u32, NodeId>> = HashMap::new();
        for edge in edges {
            let calls = edge.get_all_involved_calls();
            for c in &calls {
                let entry = map.entry(*c).or_default();
                for t in &calls {
                    entry.insert(t.rank, *t);
                }
            }
        }
        Self { map }
    }

    fn lookup(&self, from: NodeId, target_rank: u32) -> Option<NodeId> {
        self.map.get(&from).and_then(|row| row.get(&target_rank)).copied()
    }
}

fn has_lock_nearby(records: &PerRankRecords, funcs: &FuncTable, rank: u32, seq_id: u64, window: u64) -> bool {
    let Some(rank_records) = records.ranks.get(rank as usize) else {
        return false;
    };
    let lo = seq_id.saturating_sub(window) as usize;
    let hi = usize::try_from(seq_id.saturating_add(window)).unwrap_or(usize::MAX).min(rank_records.len());
    rank_records[lo..hi].iter().any(|r| matches!(funcs.name(r.func_id), Some("fcntl" | "flock")))
}

fn decide_pair(
    n1: &VerifyNode,
    n2: &VerifyNode,
    config: &VerifyConfig,
    graph: &HappensBeforeGraph,
    records: &PerRankRecords,
    funcs: &FuncTable,
    mapped: Option<&MappedEdges>,
) -> bool {
    if has_lock_nearby(records, funcs, n1.rank, n1.seq_id, config.lock_window) {
        return true;
    }

    let Some((v1, v2)) = witness::resolve(&config.semantics, config.algorithm, n1, n2, graph) else {
        return false;
    };

    match config.algorithm {
        Algorithm::GraphReachability => graph.has_path(v1, v2),
        Algorithm::TransitiveClosure | Algorithm::VectorClock => {
            let (Some(vc1), Some(vc2)) = (graph.get_vector_clock(v1), graph.get_vector_clock(v2)) else {
                return false;
            };
            vc1[v1.rank as usize] < vc2[v1.rank as usize]
        }
        Algorithm::OnTheFlyMpiScan => {
            let Some(mapped) = mapped else { return false };
            let Some(v1_node) = graph.node_at(v1) else { return false };
            let Some(start) = v1_node.index else { return false };
            let Some(rank_nodes) = graph.rank_nodes(v1.rank) else {
                return false;
            };
            for next in &rank_nodes[start + 1..] {
                if let Some(target) = mapped.lookup(next.id(), v2.rank) {
                    return target.seq_id < v2.seq_id;
                }
            }
            false
        }
    }
}

/// Runs every conflict group against `config`, applying the
/// group-level short-circuit spec.md §4.5 describes before falling
/// back to a pairwise check.
#[must_use]
pub fn verify_execution(
    graph: &HappensBeforeGraph,
    records: &PerRankRecords,
    funcs: &FuncTable,
    edges: &[MpiEdge],
    conflicts: &[ConflictGroup],
    config: &VerifyConfig,
) -> Report {
    let mapped = matches!(config.algorithm, Algorithm::OnTheFlyMpiScan).then(|| MappedEdges::build(edges));

    let mut report = Report::default();

    let find = |id: NodeId| -> Option<&VerifyNode> { graph.node_at(id) };
    let make_violation = |n1: NodeId, n2: NodeId, file: Option<String>| Violation {
        n1,
        n2,
        file,
        n1_chain: build_call_chain(records, funcs, n1.rank, n1.seq_id, config.show_call_chain),
        n2_chain: build_call_chain(records, funcs, n2.rank, n2.seq_id, config.show_call_chain),
    };

    for group in conflicts {
        let Some(n1) = find(group.c1) else { continue };

        let mut by_rank: HashMap<u32, Vec<NodeId>> = HashMap::new();
        for c2 in &group.c2s {
            by_rank.entry(c2.rank).or_default().push(*c2);
        }

        for (_, mut c2s) in by_rank {
            c2s.sort_by_key(|id| id.seq_id);
            report.total_conflicts += c2s.len() as u64;

            let decide = |a: &VerifyNode, b: &VerifyNode| decide_pair(a, b, config, graph, records, funcs, mapped.as_ref());

            let first = find(c2s[0]);
            let last = find(*c2s.last().unwrap());

            let forward_first = first.is_some_and(|f| decide(n1, f));
            if forward_first {
                continue;
            }

            let backward_last = last.is_some_and(|l| decide(l, n1));
            if backward_last {
                continue;
            }

            let forward_last = last.is_some_and(|l| decide(n1, l));
            let backward_first = first.is_some_and(|f| decide(f, n1));
            if !forward_last && !backward_first {
                report.total_violations += c2s.len() as u64;
                for c2 in &c2s {
                    report.violations.push(make_violation(n1.id(), *c2, n1.file_handle.clone()));
                }
                continue;
            }

            for c2 in &c2s {
                let Some(n2) = find(*c2) else { continue };
                let ok = decide(n1, n2) || decide(n2, n1);
                if !ok {
                    report.total_violations += 1;
                    report.violations.push(make_violation(n1.id(), *c2, n1.file_handle.clone()));
                }
            }
        }
    }

    report
}
