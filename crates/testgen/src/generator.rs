//! Generates synthetic MPI traces: per-rank [`Record`] streams, a
//! matching [`FuncTable`], and conflict groups over the file handles
//! touched by generated I/O calls.
//!
//! Ranks are wired into a ring: rank `i` sends to `(i + 1) % nprocs` and
//! receives from `(i - 1 + nprocs) % nprocs` once per round, tagged with
//! the round number so the matcher can pair them up unambiguously. Every
//! rank also opens one file, does one `MPI_File_write_at_all` per round,
//! and closes the file at the end -- this is what the conflict groups are
//! generated over.

use chrono::{DateTime, Duration, Local};
use rand::distr::{Distribution, Uniform};
use rand::RngExt;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use verifyio_core::{ConflictGroup, FuncTable, NodeId, PerRankRecords, Record};

#[derive(Clone, Debug, Default, Deserialize, Serialize, TypedBuilder)]
pub struct TraceParams {
    pub id: u64,
    pub nprocs: u32,
    pub n_rounds: u32,
    #[builder(default = 0.3)]
    pub conflict_density: f64,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GeneratedTrace {
    params: TraceParams,
    info: String,
    start: DateTime<Local>,
    end: DateTime<Local>,
    funcs: FuncTable,
    records: PerRankRecords,
    conflicts: Vec<ConflictGroup>,
}

impl GeneratedTrace {
    #[must_use]
    pub const fn get_params(&self) -> &TraceParams {
        &self.params
    }

    #[must_use]
    pub fn get_cloned_params(&self) -> TraceParams {
        self.params.clone()
    }

    #[must_use]
    pub const fn get_funcs(&self) -> &FuncTable {
        &self.funcs
    }

    #[must_use]
    pub const fn get_records(&self) -> &PerRankRecords {
        &self.records
    }

    #[must_use]
    pub const fn get_conflicts(&self) -> &Vec<ConflictGroup> {
        &self.conflicts
    }

    #[must_use]
    pub fn get_duration(&self) -> Duration {
        self.end - self.start
    }
}

const FUNC_NAMES: &[&str] = &[
    "MPI_Send",
    "MPI_Recv",
    "MPI_File_open",
    "MPI_File_write_at_all",
    "MPI_File_close",
    "MPI_Barrier",
];

fn func_id(name: &str) -> u32 {
    #[allow(clippy::cast_possible_truncation)]
    let id = FUNC_NAMES.iter().position(|&n| n == name).expect("name must be in FUNC_NAMES") as u32;
    id
}

/// Generates one trace's per-rank records and the file-handle conflicts
/// found across them.
///
/// # Panics
///
/// Panics if `nprocs` is zero (cannot form a ring, and cannot build a
/// uniform distribution over an empty range).
#[must_use]
pub fn generate_single_trace(nprocs: u32, n_rounds: u32, conflict_density: f64) -> (FuncTable, PerRankRecords, Vec<ConflictGroup>) {
    assert!(nprocs > 0, "a ring trace needs at least one rank");

    let funcs = FuncTable::new(FUNC_NAMES.iter().map(|&s| s.to_string()).collect());
    let file_handle = "shared_file";

    let mut ranks: Vec<Vec<Record>> = (0..nprocs)
        .map(|_| {
            let mut records = Vec::with_capacity(2 + 2 * n_rounds as usize);
            records.push(Record::new(func_id("MPI_File_open"), 0, vec![file_handle.to_string()]));
            records
        })
        .collect();

    for round in 0..n_rounds {
        for rank in 0..nprocs {
            let dst = (rank + 1) % nprocs;
            ranks[rank as usize].push(Record::new(
                func_id("MPI_Send"),
                0,
                vec![dst.to_string(), round.to_string(), "MPI_COMM_WORLD".to_string()],
            ));
            ranks[rank as usize].push(Record::new(
                func_id("MPI_File_write_at_all"),
                0,
                vec![file_handle.to_string()],
            ));
        }
        for rank in 0..nprocs {
            let src = (rank + nprocs - 1) % nprocs;
            ranks[rank as usize].push(Record::new(
                func_id("MPI_Recv"),
                0,
                vec![src.to_string(), round.to_string(), "MPI_COMM_WORLD".to_string()],
            ));
        }
    }

    for rank in ranks.iter_mut() {
        rank.push(Record::new(func_id("MPI_File_close"), 0, vec![file_handle.to_string()]));
    }

    let records = PerRankRecords::new(ranks);
    let conflicts = generate_conflicts(&records, nprocs, conflict_density);

    (funcs, records, conflicts)
}

/// Groups the `MPI_File_write_at_all` calls into conflict groups: the
/// first write on each rank (`c1`) conflicts with a `conflict_density`
/// fraction of the writes on every other rank (`c2s`), mimicking a
/// conflict detector that found some writes to the same file region.
fn generate_conflicts(records: &PerRankRecords, nprocs: u32, conflict_density: f64) -> Vec<ConflictGroup> {
    let write_positions: Vec<Vec<u64>> = (0..nprocs)
        .map(|rank| {
            records.ranks[rank as usize]
                .iter()
                .enumerate()
                .filter(|(_, r)| r.func_id == func_id("MPI_File_write_at_all"))
                .map(|(seq_id, _)| seq_id as u64)
                .collect()
        })
        .collect();

    let mut random_generator = rand::rng();
    let mut groups = Vec::new();
    for rank in 0..nprocs {
        let Some(&c1_seq) = write_positions[rank as usize].first() else {
            continue;
        };
        let c1 = NodeId::new(rank, c1_seq);
        let mut c2s = Vec::new();
        for other_rank in 0..nprocs {
            if other_rank == rank {
                continue;
            }
            for &seq_id in &write_positions[other_rank as usize] {
                if random_generator.random::<f64>() < conflict_density {
                    c2s.push(NodeId::new(other_rank, seq_id));
                }
            }
        }
        if !c2s.is_empty() {
            groups.push(ConflictGroup::new(c1, c2s));
        }
    }
    groups
}

#[must_use]
pub fn generate_mult_traces(n_traces: u64, nprocs: u32, n_rounds: u32, conflict_density: f64) -> Vec<GeneratedTrace> {
    (0..n_traces)
        .into_par_iter()
        .map(|id| {
            let start_time = Local::now();
            let (funcs, records, conflicts) = generate_single_trace(nprocs, n_rounds, conflict_density);
            let end_time = Local::now();
            GeneratedTrace {
                params: TraceParams {
                    id,
                    nprocs,
                    n_rounds,
                    conflict_density,
                },
                info: "generated".to_string(),
                start: start_time,
                end: end_time,
                funcs,
                records,
                conflicts,
            }
        })
        .collect()
}

/// A size-distribution helper for fuzz-style exploration: samples
/// `n_rounds` uniformly from `[min_rounds, max_rounds]`.
#[must_use]
pub fn sample_round_count(min_rounds: u32, max_rounds: u32) -> u32 {
    let mut random_generator = rand::rng();
    Uniform::new_inclusive(min_rounds, max_rounds).unwrap().sample(&mut random_generator)
}
