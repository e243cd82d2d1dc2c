//! The matching algorithm itself: point-to-point, collective, and
//! wait/test resolution over per-rank call queues.

use std::collections::VecDeque;

use hashbrown::HashMap;

use crate::matcher::decode::decode_call;
use crate::matcher::translate::CommTable;
use crate::matcher::{MatchConfig, MatchOutcome, MatchWarning};
use crate::model::accepted::{ALLTOALL_NONSYNC_FUNCS, ALLTOALL_SYNC_FUNCS, BCAST_FUNCS, MESSAGING_FUNCS, REDGAT_FUNCS};
use crate::model::edge::MpiEdge;
use crate::model::mpi_call::{MpiCall, ANY_SOURCE, ANY_TAG};
use crate::model::node::NodeId;
use crate::model::record::{FuncTable, PerRankRecords};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    PointToPoint,
    AllToAll,
    OneToMany,
    ManyToOne,
    Other,
}

struct FuncSets {
    alltoall: Vec<&'static str>,
    bcast: Vec<&'static str>,
    redgat: Vec<&'static str>,
}

impl FuncSets {
    /// Per spec.md §4.3, `mpi_sync_calls` moves the boundary between
    /// "fences against everything" and "follows the MPI standard's
    /// actual ordering guarantees": broadcasts stop fencing at all, and
    /// `MPI_Reduce_scatter` moves from the all-to-all bucket into the
    /// reduce/gather bucket (it no longer fences every other collective,
    /// only contends with other reduce/gather calls on the same key).
    fn build(cfg: &MatchConfig) -> Self {
        let mut alltoall: Vec<&'static str> = ALLTOALL_SYNC_FUNCS.to_vec();
        let mut redgat: Vec<&'static str> = REDGAT_FUNCS.to_vec();
        let bcast: Vec<&'static str> = if cfg.mpi_sync_calls { Vec::new() } else { BCAST_FUNCS.to_vec() };

        if cfg.mpi_sync_calls {
            alltoall.retain(|&f| f != "MPI_Reduce_scatter");
            redgat.push("MPI_Reduce_scatter");
        } else {
            alltoall.extend_from_slice(ALLTOALL_NONSYNC_FUNCS);
        }

        Self { alltoall, bcast, redgat }
    }

    fn kind(&self, name: &str) -> CallKind {
        if name == "MPI_Send" || name == "MPI_Ssend" || name == "MPI_Issend" || name == "MPI_Isend" || name == "MPI_Sendrecv" {
            return CallKind::PointToPoint;
        }
        if self.alltoall.contains(&name) {
            return CallKind::AllToAll;
        }
        if self.bcast.contains(&name) {
            return CallKind::OneToMany;
        }
        if self.redgat.contains(&name) {
            return CallKind::ManyToOne;
        }
        CallKind::Other
    }
}

/// One rank's decoded calls, plus the indices queued for matching.
struct RankState {
    calls: Vec<MpiCall>,
    matched: Vec<bool>,
    recv_queue: HashMap<u32, VecDeque<usize>>,
    coll_queue: HashMap<String, VecDeque<usize>>,
    wait_test_queue: HashMap<String, VecDeque<usize>>,
}

impl RankState {
    fn node(&self, idx: usize) -> NodeId {
        let c = &self.calls[idx];
        NodeId::new(c.rank, c.seq_id)
    }
}

struct MatchState {
    ranks: Vec<RankState>,
    comm_table: CommTable,
    func_sets: FuncSets,
    warnings: Vec<MatchWarning>,
}

impl MatchState {
    /// Finds the earliest still-queued `MPI_Wait`/`MPI_Test` call on
    /// `rank` completing `req` after `after_seq_id`. `src`/`tag` are not
    /// used to disambiguate -- the wait/test record never carries them
    /// (SPEC_FULL.md §9 open question), so a wildcard receive's
    /// completion is whichever wait for its request comes next.
    fn find_wait_test(&mut self, rank: u32, req: &str, after_seq_id: u64) -> Option<usize> {
        let state = &mut self.ranks[rank as usize];
        let queue = state.wait_test_queue.get_mut(req)?;
        if queue.is_empty() {
            return None;
        }
        let pos = queue.iter().position(|&idx| state.calls[idx].seq_id > after_seq_id)?;
        Some(queue.remove(pos).unwrap_or_default())
    }

    fn match_pt2pt(&mut self, rank: u32, send_idx: usize) -> Option<MpiEdge> {
        let (head, comm, dst_local, stag, seq_id) = {
            let c = &self.ranks[rank as usize].calls[send_idx];
            (self.ranks[rank as usize].node(send_idx), c.comm.clone(), c.dst, c.stag, c.seq_id)
        };
        let comm = comm?;
        let global_dst = self.comm_table.local_to_global(&comm, dst_local?)?;

        let dst_state = &self.ranks[global_dst as usize];
        let mut candidates: Vec<(u32, usize)> = dst_state.recv_queue.get(&rank).map(|q| q.iter().copied().map(|i| (rank, i)).collect()).unwrap_or_default();
        candidates.extend(dst_state.recv_queue.get(&u32::MAX).map(|q| q.iter().copied().map(|i| (u32::MAX, i))).into_iter().flatten());

        for (queue_key, recv_idx) in candidates {
            let (recv_comm, rtag, is_blocking, recv_rank) = {
                let dst_state = &self.ranks[global_dst as usize];
                let c = &dst_state.calls[recv_idx];
                (c.comm.clone(), c.rtag, c.is_blocking(), c.rank)
            };
            if recv_comm.as_deref() != Some(comm.as_str()) {
                continue;
            }
            if !(rtag == stag || rtag == ANY_TAG) {
                continue;
            }

            let tail = if is_blocking {
                self.ranks[global_dst as usize].matched[recv_idx] = true;
                Some(self.ranks[global_dst as usize].node(recv_idx))
            } else {
                let reqs = self.ranks[global_dst as usize].calls[recv_idx].reqs.clone();
                reqs.into_iter().find_map(|req| {
                    self.find_wait_test(recv_rank, &req, self.ranks[global_dst as usize].calls[recv_idx].seq_id)
                        .map(|wt_idx| {
                            self.ranks[recv_rank as usize].matched[recv_idx] = true;
                            self.ranks[recv_rank as usize].node(wt_idx)
                        })
                })
            };

            if let Some(tail) = tail {
                self.ranks[global_dst as usize]
                    .recv_queue
                    .get_mut(&queue_key)
                    .unwrap()
                    .retain(|&i| i != recv_idx);
                self.ranks[rank as usize].matched[send_idx] = true;
                return Some(MpiEdge::PointToPoint { from: head, to: tail });
            }
        }

        self.warnings.push(MatchWarning::UnmatchedSend { rank, seq_id });
        None
    }

    fn match_collective(&mut self, rank: u32, call_idx: usize, kind: CallKind) -> MpiEdge {
        let key = self.ranks[rank as usize].calls[call_idx].get_key();
        let mut all_to_all = Vec::new();
        let mut root: Option<NodeId> = None;
        let mut others = Vec::new();

        let nranks = self.ranks.len() as u32;
        for r in 0..nranks {
            let Some(idx) = self.ranks[r as usize].coll_queue.get(&key).and_then(|q| q.front().copied()) else {
                continue;
            };
            let (is_blocking, comm, src_local, reqs, seq_id) = {
                let c = &self.ranks[r as usize].calls[idx];
                (c.is_blocking(), c.comm.clone(), c.src, c.reqs.clone(), c.seq_id)
            };

            let resolved: Option<NodeId> = if is_blocking {
                self.ranks[r as usize].matched[idx] = true;
                Some(self.ranks[r as usize].node(idx))
            } else {
                reqs.into_iter().find_map(|req| {
                    self.find_wait_test(r, &req, seq_id).map(|wt_idx| {
                        self.ranks[r as usize].matched[idx] = true;
                        self.ranks[r as usize].node(wt_idx)
                    })
                })
            };

            if let Some(node) = resolved {
                let is_root = comm
                    .as_deref()
                    .zip(src_local)
                    .and_then(|(c, s)| self.comm_table.local_to_global(c, s))
                    == Some(r);
                match kind {
                    CallKind::AllToAll => all_to_all.push(node),
                    CallKind::OneToMany => {
                        if is_root {
                            root = Some(node);
                        } else {
                            others.push(node);
                        }
                    }
                    CallKind::ManyToOne => {
                        if is_root {
                            root = Some(node);
                        } else {
                            others.push(node);
                        }
                    }
                    CallKind::PointToPoint | CallKind::Other => unreachable!(),
                }
            }

            let queue = self.ranks[r as usize].coll_queue.get_mut(&key).unwrap();
            queue.pop_front();
            if queue.is_empty() {
                self.ranks[r as usize].coll_queue.remove(&key);
            }
        }

        self.ranks[rank as usize].matched[call_idx] = true;

        match kind {
            CallKind::AllToAll => MpiEdge::AllToAll { participants: all_to_all },
            CallKind::OneToMany => MpiEdge::OneToMany {
                root: root.unwrap_or_else(|| self.ranks[rank as usize].node(call_idx)),
                participants: others,
            },
            CallKind::ManyToOne => MpiEdge::ManyToOne {
                root: root.unwrap_or_else(|| self.ranks[rank as usize].node(call_idx)),
                participants: others,
            },
            CallKind::PointToPoint | CallKind::Other => unreachable!(),
        }
    }
}

/// Runs the full matching pass over every rank's decoded call stream.
#[must_use]
pub fn run(records: &PerRankRecords, funcs: &FuncTable, config: &MatchConfig) -> MatchOutcome {
    let comm_table = CommTable::build(records, funcs);
    let func_sets = FuncSets::build(config);

    let mut ranks = Vec::with_capacity(records.ranks.len());
    for (rank, recs) in records.ranks.iter().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        let rank = rank as u32;
        let mut calls = Vec::new();
        let mut recv_queue: HashMap<u32, VecDeque<usize>> = HashMap::new();
        let mut coll_queue: HashMap<String, VecDeque<usize>> = HashMap::new();
        let mut wait_test_queue: HashMap<String, VecDeque<usize>> = HashMap::new();

        for (seq_id, rec) in recs.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let seq_id = seq_id as u64;
            let Some(name) = funcs.name(rec.func_id) else { continue };
            if !MESSAGING_FUNCS.contains(&name) {
                continue;
            }
            let call = decode_call(rank, seq_id, name, rec);
            let idx = calls.len();

            if func_sets.kind(name) != CallKind::Other && func_sets.kind(name) != CallKind::PointToPoint {
                coll_queue.entry(call.get_key()).or_default().push_back(idx);
            }
            if call.is_recv() {
                if let (Some(comm), Some(src_local)) = (call.comm.as_deref(), call.src) {
                    if let Some(global_src) = comm_table.local_to_global(comm, src_local) {
                        recv_queue.entry(global_src).or_default().push_back(idx);
                    } else if src_local == ANY_SOURCE {
                        recv_queue.entry(u32::MAX).or_default().push_back(idx);
                    }
                }
            }
            if call.is_wait_or_test() {
                for req in &call.reqs {
                    wait_test_queue.entry(req.clone()).or_default().push_back(idx);
                }
            }
            calls.push(call);
        }

        let matched = vec![false; calls.len()];
        ranks.push(RankState {
            calls,
            matched,
            recv_queue,
            coll_queue,
            wait_test_queue,
        });
    }

    let mut state = MatchState {
        ranks,
        comm_table,
        func_sets,
        warnings: Vec::new(),
    };

    let mut edges = Vec::new();
    let nranks = state.ranks.len() as u32;
    for rank in 0..nranks {
        let n = state.ranks[rank as usize].calls.len();
        for idx in 0..n {
            if state.ranks[rank as usize].matched[idx] {
                continue;
            }
            let name = state.ranks[rank as usize].calls[idx].name.clone();
            let kind = state.func_sets.kind(&name);
            match kind {
                CallKind::PointToPoint => {
                    if let Some(edge) = state.match_pt2pt(rank, idx) {
                        edges.push(edge);
                    }
                }
                CallKind::AllToAll | CallKind::OneToMany | CallKind::ManyToOne => {
                    edges.push(state.match_collective(rank, idx, kind));
                }
                CallKind::Other => {}
            }
        }
    }

    for rank in 0..nranks {
        let rstate = &state.ranks[rank as usize];
        let unmatched_recvs: usize = rstate.recv_queue.values().map(VecDeque::len).sum();
        if unmatched_recvs > 0 {
            state.warnings.push(MatchWarning::UnmatchedRecv { rank, count: unmatched_recvs });
        }
        if !rstate.coll_queue.is_empty() {
            state.warnings.push(MatchWarning::UnmatchedCollective { rank, count: rstate.coll_queue.len() });
        }
    }

    MatchOutcome { edges, warnings: state.warnings }
}
