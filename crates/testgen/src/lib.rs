//! Synthetic MPI trace generation, for exercising `verifyio_core` and
//! `verifyio_altcheck` without a real Recorder trace directory.

pub mod generator;

pub use generator::{generate_mult_traces, generate_single_trace, sample_round_count, GeneratedTrace, TraceParams};
