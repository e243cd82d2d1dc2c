//! Parses `recorder.mt`: process count plus the function-name table.

use std::fs;
use std::path::Path;

use verifyio_core::FuncTable;

use crate::error::LoaderError;

const RESERVED_HEADER_BYTES: usize = 1024;

/// Reads `recorder.mt`'s process count (bytes 0-3, little-endian
/// `int32`) and its newline-separated function-name table (from byte
/// 1024 onward).
pub fn read_metadata(path: &Path) -> Result<(u32, FuncTable), LoaderError> {
    let bytes = fs::read(path)?;
    if bytes.len() < RESERVED_HEADER_BYTES {
        return Err(LoaderError::MalformedMetadata(format!(
            "file is {} bytes, expected at least {RESERVED_HEADER_BYTES}",
            bytes.len()
        )));
    }

    let nprocs_bytes: [u8; 4] = bytes[0..4]
        .try_into()
        .map_err(|_| LoaderError::MalformedMetadata("truncated process count".to_string()))?;
    let nprocs = i32::from_le_bytes(nprocs_bytes);
    if nprocs < 0 {
        return Err(LoaderError::MalformedMetadata(format!("negative process count {nprocs}")));
    }
    #[allow(clippy::cast_sign_loss)]
    let nprocs = nprocs as u32;

    let names_blob = String::from_utf8_lossy(&bytes[RESERVED_HEADER_BYTES..]);
    let names: Vec<String> = names_blob.lines().map(str::to_string).collect();

    Ok((nprocs, FuncTable::new(names)))
}
