//! Error types for the fragment codec.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, QrftError>;

#[derive(Error, Debug)]
pub enum QrftError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("{op} {path:?}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O failure on a reader or writer that has no path of its own.
    #[error("{op}: {source}")]
    Stream {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("hash mismatch: expected {expected}, got {actual} (output left at {output:?})")]
    Integrity { expected: String, actual: String, output: PathBuf },

    #[error("fragment discovery failed: {0}")]
    Discovery(String),

    #[error("encoding error: {0}")]
    Encoding(String),
}

impl From<bincode::Error> for QrftError {
    fn from(err: bincode::Error) -> Self {
        QrftError::Encoding(err.to_string())
    }
}

/// Attach the failing operation and path to an `io::Result`.
pub trait IoContext<T> {
    fn io_ctx(self, op: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn io_ctx(self, op: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| QrftError::Io { op, path: path.to_path_buf(), source })
    }
}
