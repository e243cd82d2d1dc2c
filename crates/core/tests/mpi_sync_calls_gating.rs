//! `mpi_sync_calls` (spec.md §4.3) moves the boundary between "every
//! collective is treated as a fence" and "only the MPI standard's
//! actual synchronizing collectives are": with it set, broadcasts stop
//! fencing entirely, and `MPI_Reduce_scatter` moves out of the
//! all-to-all bucket into the reduce/gather bucket.

use verifyio_core::{match_mpi_calls, FuncTable, MatchConfig, MpiEdge, PerRankRecords, Record};

fn bcast_fixture() -> (PerRankRecords, FuncTable) {
    let funcs = FuncTable::new(vec!["MPI_Bcast".to_string()]);
    let records = PerRankRecords::new(vec![
        vec![Record::new(0, 0, vec!["0".to_string(), "MPI_COMM_WORLD".to_string()])],
        vec![Record::new(0, 0, vec!["0".to_string(), "MPI_COMM_WORLD".to_string()])],
    ]);
    (records, funcs)
}

#[test]
fn mpi_sync_calls_stops_bcast_from_fencing() {
    let (records, funcs) = bcast_fixture();

    let default_outcome = match_mpi_calls(&records, &funcs, &MatchConfig::default());
    assert_eq!(default_outcome.edges.len(), 1);
    assert!(
        matches!(default_outcome.edges[0], MpiEdge::OneToMany { .. }),
        "{:?}",
        default_outcome.edges
    );

    let sync_outcome = match_mpi_calls(&records, &funcs, &MatchConfig { mpi_sync_calls: true });
    assert!(sync_outcome.edges.is_empty(), "{:?}", sync_outcome.edges);
    assert!(sync_outcome.warnings.is_empty(), "{:?}", sync_outcome.warnings);
}

fn reduce_scatter_fixture() -> (PerRankRecords, FuncTable) {
    let funcs = FuncTable::new(vec!["MPI_Reduce_scatter".to_string()]);
    let records = PerRankRecords::new(vec![
        vec![Record::new(0, 0, vec!["MPI_COMM_WORLD".to_string()])],
        vec![Record::new(0, 0, vec!["MPI_COMM_WORLD".to_string()])],
    ]);
    (records, funcs)
}

#[test]
fn mpi_sync_calls_regroups_reduce_scatter_as_redgat() {
    let (records, funcs) = reduce_scatter_fixture();

    let default_outcome = match_mpi_calls(&records, &funcs, &MatchConfig::default());
    assert_eq!(default_outcome.edges.len(), 1);
    assert!(
        matches!(default_outcome.edges[0], MpiEdge::AllToAll { .. }),
        "{:?}",
        default_outcome.edges
    );

    let sync_outcome = match_mpi_calls(&records, &funcs, &MatchConfig { mpi_sync_calls: true });
    assert_eq!(sync_outcome.edges.len(), 1);
    assert!(
        matches!(sync_outcome.edges[0], MpiEdge::ManyToOne { .. }),
        "{:?}",
        sync_outcome.edges
    );
}
