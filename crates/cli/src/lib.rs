//! `verifyio` CLI -- offline verifier for parallel-I/O happens-before
//! synchronization, plus a synthetic-trace generator and a schema
//! printer for the JSON report format.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use verifyio_core::Semantics;

#[derive(Debug, Parser)]
#[command(name = "verifyio", about = "Offline verifier for parallel-I/O happens-before synchronization")]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify a trace directory's conflicting I/O operations
    Verify(VerifyArgs),
    /// Generate synthetic trace fixtures
    Gen(GenArgs),
    /// Print the JSON Schema for the report and conflict-group formats
    Schema,
}

#[derive(Debug, Parser)]
pub struct VerifyArgs {
    /// Trace directory containing recorder.mt, per-rank records, and conflicts.dat
    pub traces_folder: PathBuf,

    /// File-consistency semantics to verify conflicting operations against
    #[arg(long, value_enum, default_value_t = SemanticsArg::MpiIo)]
    pub semantics: SemanticsArg,

    /// Decision algorithm: 1 graph reachability, 2 transitive closure (falls
    /// through to vector clock), 3 vector clock, 4 on-the-fly MPI scan
    #[arg(long, default_value_t = 3)]
    pub algorithm: u8,

    /// Witness-offset grammar, used only with `--semantics custom`
    #[arg(long, default_value = "c1:+1[MPI_File_close, MPI_File_sync] & c2:-1[MPI_File_open, MPI_File_sync]")]
    pub semantic_string: String,

    /// Treat broadcasts, gathers/reduces, file-collectives, and
    /// communicator-creation calls as all-to-all fences too
    #[arg(long)]
    pub mpi_sync_calls: bool,

    /// Scan window (in records) either side of a conflict op for fcntl/flock
    #[arg(long, default_value_t = 5)]
    pub lock_window: u64,

    /// Show each violating pair
    #[arg(long)]
    pub show_details: bool,

    /// Show the per-semantics violation summary
    #[arg(long)]
    pub show_summary: bool,

    /// Show the full call chain for each violating pair, instead of the
    /// de-duplicated per-depth partial chain
    #[arg(long)]
    pub show_call_chain: bool,

    /// Print the report as a single JSON object instead of free text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SemanticsArg {
    Posix,
    MpiIo,
    Commit,
    Session,
    Custom,
}

impl SemanticsArg {
    /// Resolves to a [`Semantics`], parsing `semantic_string` through
    /// `verifyio_parser` when `self` is [`Self::Custom`].
    ///
    /// # Errors
    ///
    /// Returns the parser's error when `semantic_string` cannot be parsed.
    pub fn resolve(self, semantic_string: &str) -> Result<Semantics, verifyio_parser::ParseError> {
        Ok(match self {
            Self::Posix => Semantics::Posix,
            Self::MpiIo => Semantics::MpiIo,
            Self::Commit => Semantics::Commit,
            Self::Session => Semantics::Session,
            Self::Custom => Semantics::Custom(verifyio_parser::parse_custom_semantics(semantic_string)?),
        })
    }
}

#[derive(Debug, Parser)]
pub struct GenArgs {
    /// Number of synthetic traces to generate
    #[arg(long, default_value_t = 1)]
    pub n_traces: u64,
    /// Number of ranks in the ring
    #[arg(long, default_value_t = 4)]
    pub nprocs: u32,
    /// Number of ring-communication rounds per trace
    #[arg(long, default_value_t = 10)]
    pub n_rounds: u32,
    /// Fraction of writes from other ranks folded into each rank's conflict group
    #[arg(long, default_value_t = 0.3)]
    pub conflict_density: f64,
    /// Output directory for generated trace fixtures (one JSON file per trace)
    #[arg(long)]
    pub output_dir: PathBuf,
}
