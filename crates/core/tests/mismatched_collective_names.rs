//! Two ranks each issue a different file-collective call (`MPI_File_write_at_all`
//! on rank 0, `MPI_File_write_all` on rank 1) against the same file handle at
//! corresponding program-order positions. The matcher keys collective calls by
//! `func_name;comm;mpifh`, so these never land in the same bucket -- each rank's
//! call is matched only against itself, producing a single-participant
//! "edge" that `HappensBeforeGraph::build` drops (it only fences edges with
//! more than one participant). A conflicting write/read pair elsewhere in the
//! same trace is therefore exactly as unsynchronized as it would be with no
//! MPI calls present at all.

mod common;

use common::{build_graph, verify_with};
use verifyio_core::{Algorithm, ConflictGroup, FuncTable, MpiEdge, NodeId, PerRankRecords, Record, Semantics};

fn fixture() -> (PerRankRecords, FuncTable, Vec<ConflictGroup>) {
    let funcs = FuncTable::new(vec![
        "noop".to_string(),
        "write".to_string(),
        "read".to_string(),
        "MPI_File_write_at_all".to_string(),
        "MPI_File_write_all".to_string(),
    ]);

    let records = PerRankRecords::new(vec![
        vec![
            Record::new(0, 0, vec![]),
            Record::new(0, 0, vec![]),
            Record::new(0, 0, vec![]),
            Record::new(1, 0, vec![]),                     // write @ (0, 3)
            Record::new(3, 0, vec!["A".to_string()]),      // MPI_File_write_at_all @ (0, 4)
        ],
        vec![
            Record::new(0, 0, vec![]),
            Record::new(0, 0, vec![]),
            Record::new(2, 0, vec![]),                     // read @ (1, 2)
            Record::new(4, 0, vec!["A".to_string()]),      // MPI_File_write_all @ (1, 3)
        ],
    ]);

    let conflicts = vec![ConflictGroup::new(NodeId::new(0, 3), vec![NodeId::new(1, 2)])];

    (records, funcs, conflicts)
}

#[test]
fn differently_named_collectives_never_pair_across_ranks() {
    let (records, funcs, conflicts) = fixture();
    let (graph, outcome) = build_graph(&records, &funcs, &conflicts);

    assert_eq!(outcome.edges.len(), 2, "each rank's call only matches itself");
    for edge in &outcome.edges {
        let MpiEdge::AllToAll { participants } = edge else {
            panic!("file-collectives default to the all-to-all fence set");
        };
        assert_eq!(participants.len(), 1, "no cross-rank participant ever joins either call");
    }

    // Unaffected by the two collective calls: same single violation as the
    // write/read pair would produce with no MPI calls at all.
    let report = verify_with(&graph, &records, &funcs, &outcome.edges, &conflicts, Semantics::MpiIo, Algorithm::VectorClock);
    assert_eq!(report.total_conflicts, 1);
    assert_eq!(report.total_violations, 1);
}
