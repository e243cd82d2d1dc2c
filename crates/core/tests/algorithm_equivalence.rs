//! On an acyclic trace, graph reachability and the vector-clock algorithm
//! must agree on every conflict pair's outcome -- they decide the same
//! question (is there a happens-before path from witness to witness) by
//! different means. This trace combines a barrier-protected pair (expected
//! synchronized) with an unrelated, unprotected pair later in program order
//! (expected violated), so both algorithms have to get both answers right,
//! not just agree trivially on an all-or-nothing outcome.

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
            Record::new(1, 0, vec![]),                                 // write_a @ (0, 3)
            Record::new(0, 0, vec![]),
            Record::new(3, 0, vec!["fh1".to_string()]),                // MPI_File_sync @ (0, 5)
            Record::new(4, 0, vec!["MPI_COMM_WORLD".to_string()]),     // MPI_Barrier @ (0, 6)
            Record::new(1, 0, vec![]),                                 // write_b @ (0, 7), after the barrier
        ],
        vec![
            Record::new(0, 0, vec![]),
            Record::new(4, 0, vec!["MPI_COMM_WORLD".to_string()]),     // MPI_Barrier @ (1, 1)
            Record::new(3, 0, vec!["fh1".to_string()]),                // MPI_File_sync @ (1, 2)
            Record::new(2, 0, vec![]),                                 // read_a @ (1, 3)
            Record::new(2, 0, vec![]),                                 // read_b @ (1, 4), unrelated to the barrier
        ],
    ]);

    let conflicts = vec![
        ConflictGroup::new(NodeId::new(0, 3), vec![NodeId::new(1, 3)]), // protected by the barrier
        ConflictGroup::new(NodeId::new(0, 7), vec![NodeId::new(1, 4)]), // not protected by anything
    ];

    (records, funcs, conflicts)
}

#[test]
fn reachability_and_vector_clock_agree_on_every_pair() {
    let (records, funcs, conflicts) = fixture();
    let (graph, outcome) = build_graph(&records, &funcs, &conflicts);
    assert_eq!(outcome.edges.len(), 1);

    for semantics in [Semantics::Posix, Semantics::Commit, Semantics::Session, Semantics::MpiIo] {
        let by_reachability = verify_with(&graph, &records, &funcs, &outcome.edges, &conflicts, semantics.clone(), Algorithm::GraphReachability);
        let by_vector_clock = verify_with(&graph, &records, &funcs, &outcome.edges, &conflicts, semantics.clone(), Algorithm::VectorClock);

        assert_eq!(
            by_reachability.total_violations, by_vector_clock.total_violations,
            "{semantics:?}: algorithms disagree on violation count"
        );

        let pairs = |r: &verifyio_core::Report| -> Vec<(NodeId, NodeId)> { r.violations.iter().map(|v| (v.n1, v.n2)).collect() };
        assert_eq!(pairs(&by_reachability), pairs(&by_vector_clock), "{semantics:?}: algorithms disagree on which pairs violate");
    }

    // Posix and MPI-IO both resolve a witness for the barrier-protected
    // pair, and both resolve the later, unprotected pair as a violation --
    // confirms the agreement above isn't a trivial all-pass or all-fail
    // result for every semantics. Commit and Session have no `fsync`/
    // `close`/`open` calls anywhere in this trace, so both groups are
    // witness-undefined for them regardless of the barrier; that's a
    // property of this fixture's function set, not a bug.
    for semantics in [Semantics::Posix, Semantics::MpiIo] {
        let report = verify_with(&graph, &records, &funcs, &outcome.edges, &conflicts, semantics.clone(), Algorithm::VectorClock);
        assert_eq!(report.total_violations, 1, "{semantics:?}");
    }
}
