//! A conflicting write/read pair where each rank calls `MPI_File_sync`
//! then joins an `MPI_Barrier` (rank 0) or the reverse order (rank 1)
//! before the conflicting operation. The barrier's ghost vertex gives a
//! program-order path from the write, through rank 0's sync and barrier,
//! through the ghost, into rank 1's barrier and sync, and on to the read.
//!
//! That single cross-rank path is enough to satisfy MPI-IO's witness pair
//! (the barrier and the subsequent sync). It also happens to satisfy
//! POSIX's witness pair (the raw write/read nodes themselves), because
//! program order always connects a rank's nodes in sequence: any path
//! from the MPI-IO witnesses composes with the program-order edges
//! leading to and from them into a path between the POSIX witnesses too.
//! So both semantics report the pair as synchronized here -- there is no
//! trace shape under this graph construction where MPI-IO finds a sync
//! path but POSIX does not, for the same conflicting pair.

mod common;

use common::{build_graph, verify_with};
use verifyio_core::{Algorithm, ConflictGroup, FuncTable, NodeId, PerRankRecords, Record, Semantics};

fn fixture() -> (PerRankRecords, FuncTable, Vec<ConflictGroup>) {
    let funcs = FuncTable::new(vec![
        "noop".to_string(),
        "write".to_string(),
        "read".to_string(),
        "MPI_File_sync".to_string(),
        "MPI_Barrier".to_string(),
    ]);

    let records = PerRankRecords::new(vec![
        vec![
            Record::new(0, 0, vec![]),
            Record::new(0, 0, vec![]),
            Record::new(0, 0, vec![]),
            Record::new(1, 0, vec![]),                                     // write @ (0, 3)
            Record::new(0, 0, vec![]),
            Record::new(3, 0, vec!["fh1".to_string()]),                    // MPI_File_sync @ (0, 5)
            Record::new(4, 0, vec!["MPI_COMM_WORLD".to_string()]),         // MPI_Barrier @ (0, 6)
        ],
        vec![
            Record::new(0, 0, vec![]),
            Record::new(4, 0, vec!["MPI_COMM_WORLD".to_string()]),         // MPI_Barrier @ (1, 1)
            Record::new(3, 0, vec!["fh1".to_string()]),                    // MPI_File_sync @ (1, 2)
            Record::new(2, 0, vec![]),                                     // read @ (1, 3)
        ],
    ]);

    let conflicts = vec![ConflictGroup::new(NodeId::new(0, 3), vec![NodeId::new(1, 3)])];

    (records, funcs, conflicts)
}

#[test]
fn barrier_and_sync_synchronize_under_both_posix_and_mpi_io() {
    let (records, funcs, conflicts) = fixture();
    let (graph, outcome) = build_graph(&records, &funcs, &conflicts);

    assert_eq!(outcome.edges.len(), 1, "only the barrier pairs up; MPI_File_sync creates no edge by itself");
    assert!(outcome.warnings.is_empty());

    for semantics in [Semantics::Posix, Semantics::MpiIo] {
        for algorithm in [Algorithm::GraphReachability, Algorithm::VectorClock] {
            let report = verify_with(&graph, &records, &funcs, &outcome.edges, &conflicts, semantics.clone(), algorithm);
            assert_eq!(report.total_violations, 0, "{semantics:?} / {algorithm:?}: barrier path should synchronize the pair");
        }
    }
}
