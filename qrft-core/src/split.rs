use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{IoContext, QrftError, Result};
use crate::fragment::{create_dir_all, create_file, fragment_name, temp_name};
use crate::header::Metadata;
use crate::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, MAX_CHUNKS, MIN_CHUNKS};

#[derive(Clone, Debug)]
pub struct SplitConfig {
    pub chunk_count: usize,
    pub file_mode: u32,
    pub dir_mode: u32,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self { chunk_count: MIN_CHUNKS, file_mode: DEFAULT_FILE_MODE, dir_mode: DEFAULT_DIR_MODE }
    }
}

impl SplitConfig {
    pub fn with_chunks(chunk_count: usize) -> Self {
        Self { chunk_count, ..Self::default() }
    }
}

#[derive(Clone, Debug)]
pub struct SplitReport {
    /// Fragment paths in ordinal order; the first carries the header.
    pub fragments: Vec<PathBuf>,
    pub metadata: Metadata,
}

/// Read-buffer size for a source of `len` bytes split `chunk_count` ways.
/// Every fragment but the last is exactly this long.
pub fn buffer_size(len: u64, chunk_count: usize) -> u64 {
    len / chunk_count as u64 + 1
}

/// Number of fragments a split of `len` bytes produces. An empty source
/// still gets a header-only fragment 0.
pub fn expected_fragments(len: u64, chunk_count: usize) -> u64 {
    len.div_ceil(buffer_size(len, chunk_count)).max(1)
}

pub struct Splitter;

impl Splitter {
    /// Split the file at `path`, naming fragments after its file stem.
    pub fn split_file(path: &Path, out_dir: &Path, cfg: &SplitConfig) -> Result<SplitReport> {
        let f = File::open(path).io_ctx("open", path)?;
        let len = f.metadata().io_ctx("stat", path)?.len();
        let name = path
            .file_name()
            .ok_or_else(|| QrftError::Validation(format!("{path:?} has no file name")))?
            .to_str()
            .ok_or_else(|| QrftError::Validation(format!("{path:?} is not valid UTF-8")))?;
        Self::split_stream(f, len, name, out_dir, cfg)
    }

    /// Split `source` (of declared length `source_len`) into fragment files in
    /// `out_dir`. Fragment 0 receives the header once the stream is exhausted.
    pub fn split_stream<R: Read>(
        mut source: R,
        source_len: u64,
        name: &str,
        out_dir: &Path,
        cfg: &SplitConfig,
    ) -> Result<SplitReport> {
        if cfg.chunk_count < MIN_CHUNKS {
            return Err(QrftError::Validation(format!(
                "chunk count must be at least {MIN_CHUNKS}, got {}",
                cfg.chunk_count
            )));
        }
        if cfg.chunk_count > MAX_CHUNKS {
            return Err(QrftError::Validation(format!(
                "chunk count must be at most {MAX_CHUNKS}, got {}",
                cfg.chunk_count
            )));
        }

        if name.is_empty() || name.contains(is_separator) {
            return Err(QrftError::Validation(format!(
                "source name must be a bare file name, got {name:?}"
            )));
        }

        let buf_len = usize::try_from(buffer_size(source_len, cfg.chunk_count)).map_err(|_| {
            QrftError::Validation(format!("source of {source_len} bytes is too large"))
        })?;
        create_dir_all(out_dir, cfg.dir_mode)?;

        let base = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name)
            .to_string();
        let tmp_path = out_dir.join(temp_name(&base));

        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; buf_len];
        let mut fragments: Vec<PathBuf> = Vec::new();
        let mut total_bytes: u64 = 0;
        loop {
            let n = read_full(&mut source, &mut buf).io_ctx("read", Path::new(name))?;
            if n == 0 && !fragments.is_empty() {
                break;
            }
            let i = fragments.len();
            if i >= MAX_CHUNKS {
                return Err(QrftError::Validation(format!(
                    "source is longer than its declared {source_len} bytes"
                )));
            }
            let path =
                if i == 0 { tmp_path.clone() } else { out_dir.join(fragment_name(&base, i)) };
            let mut out = create_file(&path, cfg.file_mode)?;
            out.write_all(&buf[..n]).io_ctx("write", &path)?;
            hasher.update(&buf[..n]);
            total_bytes += n as u64;
            debug!(index = i, bytes = n, path = ?path, "wrote fragment");
            fragments.push(path);
            if n < buf_len {
                break;
            }
        }

        let metadata = Metadata::new(
            hasher.finalize().into(),
            fragments.len() as u32,
            total_bytes as i64,
            chrono::Utc::now().timestamp(),
            name,
        );
        let first = out_dir.join(fragment_name(&base, 0));
        fragments[0] = embed_header(&tmp_path, &first, &metadata, cfg)?;

        info!(
            fragments = fragments.len(),
            bytes = total_bytes,
            hash = %metadata.hash_hex(),
            "split {name} into {:?}",
            out_dir
        );
        Ok(SplitReport { fragments, metadata })
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || (cfg!(windows) && c == '\\')
}

/// Fill `buf` as far as the reader allows; short only at end of stream.
fn read_full<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Write `meta` followed by the bytes of `tmp` into `dst`, then drop `tmp`.
fn embed_header(tmp: &Path, dst: &Path, meta: &Metadata, cfg: &SplitConfig) -> Result<PathBuf> {
    {
        let mut src = File::open(tmp).io_ctx("open", tmp)?;
        let mut out = BufWriter::new(create_file(dst, cfg.file_mode)?);
        out.write_all(&meta.encode()).io_ctx("write header", dst)?;
        io::copy(&mut src, &mut out).io_ctx("copy", dst)?;
        out.flush().io_ctx("flush", dst)?;
    }
    fs::remove_file(tmp).io_ctx("remove", tmp)?;
    Ok(dst.to_path_buf())
}
