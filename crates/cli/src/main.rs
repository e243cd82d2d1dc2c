use std::time::Instant;
use std::{fs, process};

use clap::Parser;
use verifyio_cli::{App, Command, GenArgs, VerifyArgs};
use verifyio_core::{extract_nodes, finalize, match_mpi_calls, merge_conflict_nodes, Algorithm, HappensBeforeGraph, MatchConfig, Report, VerifyConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let app = App::parse();
    match &app.command {
        Command::Verify(args) => verify(args),
        Command::Gen(args) => gen(args),
        Command::Schema => schema(),
    }
}

/// Exit code for a configuration or I/O error the user must fix before
/// retrying (spec.md §7 "configuration error"): missing
/// `RECORDER_INSTALL_PATH`, missing trace files, malformed binary data.
const EXIT_CONFIG_ERROR: i32 = 2;
/// Exit code for a detected happens-before cycle (spec.md §7 "trace
/// inconsistency"): the trace itself is malformed, not the CLI invocation.
const EXIT_CYCLE_DETECTED: i32 = 3;

fn verify(args: &VerifyArgs) {
    let semantics = args.semantics.resolve(&args.semantic_string).unwrap_or_else(|e| {
        eprintln!("invalid --semantic_string: {e}");
        process::exit(EXIT_CONFIG_ERROR);
    });
    let algorithm = Algorithm::from_u8(args.algorithm).unwrap_or_else(|| {
        eprintln!("invalid --algorithm {}: must be 1, 2, 3, or 4", args.algorithm);
        process::exit(EXIT_CONFIG_ERROR);
    });

    let t1 = Instant::now();
    let trace = verifyio_loader::load_trace(&args.traces_folder).unwrap_or_else(|e| {
        eprintln!("failed to read trace {}: {e}", args.traces_folder.display());
        process::exit(EXIT_CONFIG_ERROR);
    });
    tracing::debug!(nprocs = trace.nprocs, "loaded trace");
    println!("Step 1. read trace records and conflicts time: {:.3} secs", t1.elapsed().as_secs_f64());

    let t2 = Instant::now();
    let mut nodes = extract_nodes(&trace.records, &trace.funcs);
    merge_conflict_nodes(&mut nodes, &trace.conflicts, &trace.records, &trace.funcs);
    finalize(&mut nodes);
    let total_nodes: usize = nodes.iter().map(Vec::len).sum();
    println!("Step 2. extract verify nodes: {:.3} secs, nodes: {total_nodes}", t2.elapsed().as_secs_f64());

    let t3 = Instant::now();
    let match_config = MatchConfig {
        mpi_sync_calls: args.mpi_sync_calls,
    };
    let outcome = match_mpi_calls(&trace.records, &trace.funcs, &match_config);
    println!("Step 3. match mpi calls: {:.3} secs, mpi edges: {}", t3.elapsed().as_secs_f64(), outcome.edges.len());
    for warning in &outcome.warnings {
        println!("warning: {warning}");
    }

    let t4 = Instant::now();
    let graph = HappensBeforeGraph::build(nodes, &outcome.edges, matches!(algorithm, Algorithm::VectorClock | Algorithm::TransitiveClosure))
        .unwrap_or_else(|cycle| {
            eprintln!("trace inconsistency: {cycle}");
            process::exit(EXIT_CYCLE_DETECTED);
        });
    println!("Step 4. build happens-before graph: {:.3} secs, nodes: {total_nodes}", t4.elapsed().as_secs_f64());

    let config = VerifyConfig {
        semantics,
        algorithm,
        lock_window: args.lock_window,
        show_details: args.show_details,
        show_call_chain: args.show_call_chain,
    };

    let t5 = Instant::now();
    let report = verifyio_core::verify_execution(&graph, &trace.records, &trace.funcs, &outcome.edges, &trace.conflicts, &config);
    println!(
        "Step 5. {:?} semantics verification time: {:.3} secs, total conflicts: {}, violations: {}",
        config.semantics,
        t5.elapsed().as_secs_f64(),
        report.total_conflicts,
        report.total_violations
    );

    render_report(&report, args);
}

fn render_report(report: &Report, args: &VerifyArgs) {
    if args.json {
        serde_json::to_writer_pretty(std::io::stdout(), report).unwrap_or_else(|e| {
            eprintln!("failed to serialize report: {e}");
            process::exit(EXIT_CONFIG_ERROR);
        });
        println!();
        return;
    }

    if args.show_details {
        for v in &report.violations {
            let file = v.file.as_deref().unwrap_or("?");
            print!("violation: {} <-> {} on file {file}", v.n1, v.n2);
            if let Some(chain) = &v.n1_chain {
                print!(" | c1 chain: {}", chain.join());
            }
            if let Some(chain) = &v.n2_chain {
                print!(" | c2 chain: {}", chain.join());
            }
            println!();
        }
    }

    if args.show_summary {
        println!("total conflicts: {}, total violations: {}", report.total_conflicts, report.total_violations);
    }
}

fn gen(args: &GenArgs) {
    fs::create_dir_all(&args.output_dir).unwrap_or_else(|e| {
        eprintln!("failed to create output directory {}: {e}", args.output_dir.display());
        process::exit(EXIT_CONFIG_ERROR);
    });

    let traces = verifyio_testgen::generate_mult_traces(args.n_traces, args.nprocs, args.n_rounds, args.conflict_density);

    for trace in &traces {
        let path = args.output_dir.join(format!("{}.json", trace.get_params().id));
        let file = fs::File::create(&path).unwrap_or_else(|e| {
            eprintln!("failed to create {}: {e}", path.display());
            process::exit(EXIT_CONFIG_ERROR);
        });
        serde_json::to_writer_pretty(file, trace).unwrap_or_else(|e| {
            eprintln!("failed to write {}: {e}", path.display());
            process::exit(EXIT_CONFIG_ERROR);
        });
    }

    println!("generated {} trace(s) to {}", traces.len(), args.output_dir.display());
}

fn schema() {
    let report_schema = schemars::schema_for!(verifyio_core::Report);
    let conflict_schema = schemars::schema_for!(verifyio_core::ConflictGroup);

    let combined = serde_json::json!({
        "Report": report_schema,
        "ConflictGroup": conflict_schema,
    });
    serde_json::to_writer_pretty(std::io::stdout(), &combined).unwrap_or_else(|e| {
        eprintln!("failed to serialize schema: {e}");
        process::exit(EXIT_CONFIG_ERROR);
    });
    println!();
}
