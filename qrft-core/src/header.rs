use crate::error::{IoContext, QrftError, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Header layout (big-endian, no padding):
/// hash (32) + total (u32) + size (i64) + time (i64) + name (46)
pub const HASH_LEN: usize = 32;
pub const NAME_LEN: usize = 46;
pub const HEADER_LEN: usize = HASH_LEN + 4 + 8 + 8 + NAME_LEN; // 98

const TOTAL_OFF: usize = HASH_LEN;
const SIZE_OFF: usize = TOTAL_OFF + 4;
const TIME_OFF: usize = SIZE_OFF + 8;
const NAME_OFF: usize = TIME_OFF + 8;

/// Provenance and integrity record prefixed to fragment 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub hash: [u8; HASH_LEN],
    pub total: u32,
    pub size: i64,
    pub time: i64,
    pub name: [u8; NAME_LEN],
}

impl Metadata {
    /// Build a record; `name` is cut to `NAME_LEN` raw bytes, or zero-padded.
    pub fn new(hash: [u8; HASH_LEN], total: u32, size: i64, time: i64, name: &str) -> Self {
        let mut buf = [0u8; NAME_LEN];
        let raw = name.as_bytes();
        let n = raw.len().min(NAME_LEN);
        buf[..n].copy_from_slice(&raw[..n]);
        Self { hash, total, size, time, name: buf }
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..TOTAL_OFF].copy_from_slice(&self.hash);
        out[TOTAL_OFF..SIZE_OFF].copy_from_slice(&self.total.to_be_bytes());
        out[SIZE_OFF..TIME_OFF].copy_from_slice(&self.size.to_be_bytes());
        out[TIME_OFF..NAME_OFF].copy_from_slice(&self.time.to_be_bytes());
        out[NAME_OFF..].copy_from_slice(&self.name);
        out
    }

    /// Read exactly `HEADER_LEN` bytes from `r`. A short stream is an encoding
    /// error, anything else the reader reports is surfaced as I/O.
    pub fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let mut buf = [0u8; HEADER_LEN];
        if let Err(e) = r.read_exact(&mut buf) {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                return Err(QrftError::Encoding(format!(
                    "truncated header: need {HEADER_LEN} bytes"
                )));
            }
            return Err(QrftError::Stream { op: "read header", source: e });
        }
        Ok(Self::from_bytes(&buf))
    }

    pub fn from_bytes(buf: &[u8; HEADER_LEN]) -> Self {
        let mut hash = [0u8; HASH_LEN];
        hash.copy_from_slice(&buf[..TOTAL_OFF]);
        let mut total4 = [0u8; 4];
        total4.copy_from_slice(&buf[TOTAL_OFF..SIZE_OFF]);
        let mut size8 = [0u8; 8];
        size8.copy_from_slice(&buf[SIZE_OFF..TIME_OFF]);
        let mut time8 = [0u8; 8];
        time8.copy_from_slice(&buf[TIME_OFF..NAME_OFF]);
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&buf[NAME_OFF..]);
        Self {
            hash,
            total: u32::from_be_bytes(total4),
            size: i64::from_be_bytes(size8),
            time: i64::from_be_bytes(time8),
            name,
        }
    }

    /// Stored name without its trailing zero padding.
    pub fn name_bytes(&self) -> &[u8] {
        let end = self.name.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        &self.name[..end]
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Decode the header at the start of a first fragment on disk.
pub fn read_header(path: &Path) -> Result<Metadata> {
    let mut f = File::open(path).io_ctx("open", path)?;
    Metadata::decode(&mut f).map_err(|e| match e {
        QrftError::Stream { op, source } => QrftError::Io { op, path: path.to_path_buf(), source },
        QrftError::Encoding(msg) => QrftError::Encoding(format!("{msg} in {path:?}")),
        other => other,
    })
}
