//! A conflicting write/read pair with no synchronization between them at
//! all -- no MPI calls, no locks, no shared sync point -- must be reported
//! as a violation under every file-consistency semantics, since there is
//! no witness chain any of them could possibly find.

mod common;

use common::{build_graph, verify_with};
use verifyio_core::{Algorithm, ConflictGroup, FuncTable, NodeId, PerRankRecords, Record, Semantics};

fn fixture() -> (PerRankRecords, FuncTable, Vec<ConflictGroup>) {
    let funcs = FuncTable::new(vec!["noop".to_string(), "write".to_string(), "read".to_string()]);

    let records = PerRankRecords::new(vec![
        vec![
            Record::new(0, 0, vec![]),
            Record::new(0, 0, vec![]),
            Record::new(0, 0, vec![]),
            Record::new(1, 0, vec![]), // write @ (0, 3)
        ],
        vec![
            Record::new(0, 0, vec![]),
            Record::new(0, 0, vec![]),
            Record::new(2, 0, vec![]), // read @ (1, 2)
        ],
    ]);

    let conflicts = vec![ConflictGroup::new(NodeId::new(0, 3), vec![NodeId::new(1, 2)])];

    (records, funcs, conflicts)
}

#[test]
fn reports_one_violation_under_every_semantics() {
    let (records, funcs, conflicts) = fixture();
    let (graph, outcome) = build_graph(&records, &funcs, &conflicts);
    assert!(outcome.edges.is_empty(), "no MPI calls in this trace, so no synchronization edges");
    assert!(outcome.warnings.is_empty());

    for semantics in [Semantics::Posix, Semantics::Commit, Semantics::Session, Semantics::MpiIo] {
        let report = verify_with(&graph, &records, &funcs, &outcome.edges, &conflicts, semantics.clone(), Algorithm::VectorClock);
        assert_eq!(report.total_conflicts, 1, "{semantics:?}");
        assert_eq!(report.total_violations, 1, "{semantics:?}: no sync point exists between the pair");
    }
}
