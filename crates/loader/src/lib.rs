//! Reads a Recorder trace directory into the types `verifyio_core` operates on.
//!
//! A trace directory holds `recorder.mt` (process count and function
//! table), the dense per-rank record streams (read through Recorder's
//! native `libreader.so` via [`ffi`]), and `conflicts.dat` (the
//! conflict detector's output, parsed in [`conflicts`]). [`load_trace`]
//! combines all three into a [`TraceData`] ready for
//! `verifyio_core::extract_nodes` and `verifyio_core::verify_execution`.

pub mod conflicts;
pub mod error;
pub mod ffi;
pub mod metadata;

use std::path::Path;

use verifyio_core::{ConflictGroup, FuncTable, PerRankRecords};

pub use error::LoaderError;
pub use ffi::NativeReader;

/// Everything read from one trace directory.
pub struct TraceData {
    pub nprocs: u32,
    pub funcs: FuncTable,
    pub records: PerRankRecords,
    pub conflicts: Vec<ConflictGroup>,
}

/// Reads `recorder.mt`, dlopens the native reader to pull every rank's
/// records, and parses `conflicts.dat`, all rooted at `traces_folder`.
pub fn load_trace(traces_folder: &Path) -> Result<TraceData, LoaderError> {
    let (nprocs, funcs) = metadata::read_metadata(&traces_folder.join("recorder.mt"))?;

    let reader = NativeReader::open()?;
    let records = reader.read_records(traces_folder, nprocs)?;

    let conflicts = conflicts::read_conflicts(&traces_folder.join("conflicts.dat"))?;

    Ok(TraceData {
        nprocs,
        funcs,
        records,
        conflicts,
    })
}
