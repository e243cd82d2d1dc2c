//! Shared fixture-building helpers for the integration test suite.
//!
//! Every test here hand-builds a small `PerRankRecords` + `ConflictGroup`
//! list and runs it through the same pipeline `verifyio verify` runs:
//! extract nodes, match MPI calls, build the happens-before graph, decide
//! each conflict. These two helpers exist so the scenario tests themselves
//! stay focused on the record layout and the expected outcome.

use verifyio_core::{
    extract_nodes, finalize, match_mpi_calls, merge_conflict_nodes, Algorithm, ConflictGroup, FuncTable, HappensBeforeGraph, MatchConfig, MatchOutcome, MpiEdge,
    PerRankRecords, Report, Semantics, VerifyConfig,
};

/// Extracts nodes, matches MPI calls, and builds the happens-before graph
/// (with vector clocks, so either algorithm can run against the result).
pub fn build_graph(records: &PerRankRecords, funcs: &FuncTable, conflicts: &[ConflictGroup]) -> (HappensBeforeGraph, MatchOutcome) {
    let mut nodes = extract_nodes(records, funcs);
    merge_conflict_nodes(&mut nodes, conflicts, records, funcs);
    finalize(&mut nodes);

    let outcome = match_mpi_calls(records, funcs, &MatchConfig::default());
    let graph = HappensBeforeGraph::build(nodes, &outcome.edges, true).expect("fixture trace must be acyclic");
    (graph, outcome)
}

/// Runs `verify_execution` for one semantics/algorithm pair against an
/// already-built graph.
pub fn verify_with(
    graph: &HappensBeforeGraph,
    records: &PerRankRecords,
    funcs: &FuncTable,
    edges: &[MpiEdge],
    conflicts: &[ConflictGroup],
    semantics: Semantics,
    algorithm: Algorithm,
) -> Report {
    let config = VerifyConfig {
        semantics,
        algorithm,
        ..VerifyConfig::default()
    };
    verifyio_core::verify_execution(graph, records, funcs, edges, conflicts, &config)
}
