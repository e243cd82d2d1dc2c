//! Loads the native reader library (`libreader.so`) and calls
//! `recorder_read_verifyio_records` to get the per-rank record arrays.
//!
//! The library is resolved at runtime via `libloading` rather than linked
//! at build time: this crate never assumes Recorder is installed on the
//! machine building it, only on the machine running a verification.

use std::ffi::{c_char, c_int, CStr, CString};
use std::os::raw::c_uchar;
use std::path::{Path, PathBuf};

use verifyio_core::{PerRankRecords, Record};

use crate::error::LoaderError;

/// Mirrors `PyRecord` / `VerifyIORecord` in Recorder's `tools/reader.h`.
///
/// Field order and widths must match the C struct exactly: `func_id` is a
/// native `int`, `call_depth` and `arg_count` are single bytes, and `args`
/// is a C array of `arg_count` NUL-terminated strings.
#[repr(C)]
struct CRecord {
    func_id: c_int,
    call_depth: c_uchar,
    arg_count: c_uchar,
    args: *mut *mut c_char,
}

type ReadRecordsFn = unsafe extern "C" fn(logs_dir: *const c_char, num_records: *mut usize) -> *mut *mut CRecord;

/// A loaded handle to `libreader.so`, bound to one Recorder installation.
pub struct NativeReader {
    _library: libloading::Library,
    read_records: ReadRecordsFn,
}

impl NativeReader {
    /// Locates `libreader.so` under `$RECORDER_INSTALL_PATH/lib` and dlopens it.
    pub fn open() -> Result<Self, LoaderError> {
        let install_path = std::env::var_os("RECORDER_INSTALL_PATH").ok_or(LoaderError::MissingInstallPath)?;
        let lib_path: PathBuf = Path::new(&install_path).join("lib").join("libreader.so");
        if !lib_path.is_file() {
            return Err(LoaderError::NativeLibraryNotFound(lib_path));
        }

        // SAFETY: `lib_path` points at a file we just confirmed exists;
        // the symbol lookup below checks the signature matches what we
        // declared, but cannot verify the ABI the library was built with.
        unsafe {
            let library = libloading::Library::new(&lib_path)?;
            let read_records: libloading::Symbol<ReadRecordsFn> = library.get(b"recorder_read_verifyio_records\0")?;
            let read_records = *read_records;
            Ok(Self {
                _library: library,
                read_records,
            })
        }
    }

    /// Reads every rank's records for the trace under `logs_dir`.
    pub fn read_records(&self, logs_dir: &Path, nprocs: u32) -> Result<PerRankRecords, LoaderError> {
        let logs_dir_c = CString::new(logs_dir.to_string_lossy().as_bytes())
            .map_err(|_| LoaderError::MalformedMetadata("logs_dir contains a NUL byte".to_string()))?;

        let mut num_records = vec![0usize; nprocs as usize];

        // SAFETY: `read_records` is the native reader's documented entry
        // point; `num_records` is sized to `nprocs`, matching what the
        // native side is told via `recorder.mt`, and the returned
        // `rank_ptrs[rank]` array is exactly `num_records[rank]` long.
        let ranks = unsafe {
            let rank_ptrs = (self.read_records)(logs_dir_c.as_ptr(), num_records.as_mut_ptr());
            if rank_ptrs.is_null() {
                return Err(LoaderError::MalformedMetadata("native reader returned a null record table".to_string()));
            }

            let mut ranks = Vec::with_capacity(nprocs as usize);
            for rank in 0..nprocs as usize {
                let count = num_records[rank];
                let rank_ptr = *rank_ptrs.add(rank);
                let mut records = Vec::with_capacity(count);
                for i in 0..count {
                    records.push(decode_record(&*rank_ptr.add(i)));
                }
                ranks.push(records);
            }
            ranks
        };

        Ok(PerRankRecords::new(ranks))
    }
}

/// # Safety
/// `raw` must point at a live `CRecord` whose `args` array has exactly
/// `arg_count` valid, NUL-terminated C strings.
unsafe fn decode_record(raw: &CRecord) -> Record {
    let mut args = Vec::with_capacity(raw.arg_count as usize);
    for i in 0..raw.arg_count as usize {
        let arg_ptr = *raw.args.add(i);
        let arg = if arg_ptr.is_null() {
            String::new()
        } else {
            CStr::from_ptr(arg_ptr).to_string_lossy().into_owned()
        };
        args.push(arg);
    }
    #[allow(clippy::cast_sign_loss)]
    Record::new(raw.func_id as u32, raw.call_depth, args)
}
