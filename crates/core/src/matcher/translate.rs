//! Communicator local-rank-to-world-rank translation.

use hashbrown::HashMap;

use crate::model::record::{FuncTable, PerRankRecords};

const COMM_CREATING_FUNCS: &[&str] = &["MPI_Comm_split", "MPI_Comm_split_type", "MPI_Comm_dup", "MPI_Cart_create", "MPI_Cart_sub"];

/// Maps `comm_name -> array[local_rank] = world_rank`. `MPI_COMM_WORLD`
/// is identity by construction; every communicator-creating call grows
/// the table by recording the creator's world rank at its local rank in
/// the new communicator.
#[derive(Debug, Clone, Default)]
pub struct CommTable {
    table: HashMap<String, Vec<u32>>,
}

impl CommTable {
    #[must_use]
    pub fn build(records: &PerRankRecords, funcs: &FuncTable) -> Self {
        let nprocs = records.nprocs();
        let mut table = HashMap::new();
        table.insert("MPI_COMM_WORLD".to_string(), (0..nprocs).collect());

        for (rank, recs) in records.ranks.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let rank = rank as u32;
            for rec in recs {
                let Some(name) = funcs.name(rec.func_id) else { continue };
                if !COMM_CREATING_FUNCS.contains(&name) {
                    continue;
                }
                let Some(comm) = rec.arg(0) else { continue };
                let Some(local_rank) = rec.arg(1).and_then(|s| s.parse::<usize>().ok()) else {
                    continue;
                };
                let entry = table.entry(comm.to_string()).or_insert_with(|| vec![0; nprocs as usize]);
                if entry.len() <= local_rank {
                    entry.resize(local_rank + 1, 0);
                }
                entry[local_rank] = rank;
            }
        }

        Self { table }
    }

    /// Converts `local_rank` within `comm` to its world rank.
    #[must_use]
    pub fn local_to_global(&self, comm: &str, local_rank: i64) -> Option<u32> {
        if local_rank < 0 {
            return None;
        }
        self.table.get(comm)?.get(local_rank as usize).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::Record;

    #[test]
    fn test_world_comm_is_identity() {
        let records = PerRankRecords::new(vec![vec![], vec![]]);
        let funcs = FuncTable::new(vec![]);
        let table = CommTable::build(&records, &funcs);
        assert_eq!(table.local_to_global("MPI_COMM_WORLD", 1), Some(1));
    }

    #[test]
    fn test_split_comm_translation() {
        let funcs = FuncTable::new(vec!["MPI_Comm_split".to_string()]);
        let records = PerRankRecords::new(vec![
            vec![Record::new(0, 0, vec!["sub".to_string(), "0".to_string()])],
            vec![Record::new(0, 0, vec!["sub".to_string(), "0".to_string()])],
        ]);
        let table = CommTable::build(&records, &funcs);
        assert_eq!(table.local_to_global("sub", 0), Some(1));
    }
}
