//! Turns raw per-rank records into verify nodes.

use hashbrown::HashSet;

use crate::model::accepted::{has_file_handle_arg0, is_accepted};
use crate::model::conflict::ConflictGroup;
use crate::model::node::{NodeId, VerifyNode};
use crate::model::record::{FuncTable, PerRankRecords};

/// Scans every rank's record stream and emits a [`VerifyNode`] for each
/// accepted call (messaging/collective or metadata I/O, per
/// `model::accepted`), with `file_handle` populated from argument 0
/// when applicable.
///
/// The returned lists are in `seq_id` order already (records are read
/// in that order), but callers that still need to merge in
/// conflict-participant nodes should call [`finalize`] afterward, which
/// is the only step that re-sorts and assigns `index`.
#[must_use]
pub fn extract_nodes(records: &PerRankRecords, funcs: &FuncTable) -> Vec<Vec<VerifyNode>> {
    records
        .ranks
        .iter()
        .enumerate()
        .map(|(rank, recs)| {
            #[allow(clippy::cast_possible_truncation)]
            let rank = rank as u32;
            recs.iter()
                .enumerate()
                .filter_map(|(seq_id, rec)| {
                    let name = funcs.name(rec.func_id)?;
                    if !is_accepted(name) {
                        return None;
                    }
                    let file_handle = if has_file_handle_arg0(name) {
                        rec.arg(0).map(str::to_string)
                    } else {
                        None
                    };
                    #[allow(clippy::cast_possible_truncation)]
                    let seq_id = seq_id as u64;
                    Some(VerifyNode::new(rank, seq_id, name.to_string(), file_handle))
                })
                .collect()
        })
        .collect()
}

/// Appends a [`VerifyNode`] for every `(rank, seq_id)` a conflict group
/// references that `extract_nodes` didn't already keep -- a conflicting
/// operation is not necessarily a messaging/collective/metadata-I/O call
/// (e.g. a plain `write`/`read` syscall the extractor's accepted-function
/// filter has no reason to know about). Mirrors the reference's
/// `create_verifyio_node` used while reading `conflicts.dat`: the merged
/// node carries no `file_handle` (the conflict detector already knows
/// the file; re-deriving it from the raw record isn't attempted).
///
/// Call before [`finalize`], which does the sort-and-index pass once
/// every node -- extracted and conflict-merged -- is present.
pub fn merge_conflict_nodes(nodes: &mut [Vec<VerifyNode>], conflicts: &[ConflictGroup], records: &PerRankRecords, funcs: &FuncTable) {
    let mut seen: HashSet<NodeId> = nodes.iter().flatten().map(VerifyNode::id).collect();
    for group in conflicts {
        for id in core::iter::once(group.c1).chain(group.c2s.iter().copied()) {
            if !seen.insert(id) {
                continue;
            }
            let Some(seq_id) = usize::try_from(id.seq_id).ok() else {
                continue;
            };
            let Some(rec) = records.ranks.get(id.rank as usize).and_then(|r| r.get(seq_id)) else {
                continue;
            };
            let Some(name) = funcs.name(rec.func_id) else {
                continue;
            };
            if let Some(rank_nodes) = nodes.get_mut(id.rank as usize) {
                rank_nodes.push(VerifyNode::new(id.rank, id.seq_id, name.to_string(), None));
            }
        }
    }
}

/// Deduplicates by `(rank, seq_id)`, sorts each rank's node list by
/// `seq_id`, and assigns `index` in that order. Call this once all
/// conflict-participant nodes have been appended to `nodes`.
pub fn finalize(nodes: &mut [Vec<VerifyNode>]) {
    for rank_nodes in nodes.iter_mut() {
        let mut seen = HashSet::new();
        rank_nodes.retain(|n| seen.insert(n.id()));
        rank_nodes.sort_by_key(VerifyNode::id);
        for (i, n) in rank_nodes.iter_mut().enumerate() {
            n.index = Some(i);
        }
    }
}
