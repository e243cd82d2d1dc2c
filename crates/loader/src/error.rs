//! Loader error taxonomy: everything here is fatal (spec.md §7,
//! "configuration error" / malformed trace input).

use std::path::PathBuf;

#[derive(Debug, derive_more::From)]
pub enum LoaderError {
    #[from]
    Io(std::io::Error),
    #[from]
    DynamicLibrary(libloading::Error),
    MissingInstallPath,
    NativeLibraryNotFound(PathBuf),
    MalformedMetadata(String),
    MalformedConflictFile(String),
}

impl std::fmt::Display for LoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::DynamicLibrary(e) => write!(f, "failed to load native reader: {e}"),
            Self::MissingInstallPath => {
                write!(f, "RECORDER_INSTALL_PATH environment variable is not set")
            }
            Self::NativeLibraryNotFound(p) => write!(f, "native reader library not found at {}", p.display()),
            Self::MalformedMetadata(msg) => write!(f, "malformed recorder.mt: {msg}"),
            Self::MalformedConflictFile(msg) => write!(f, "malformed conflicts.dat: {msg}"),
        }
    }
}

impl std::error::Error for LoaderError {}
