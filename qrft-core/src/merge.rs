use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::discover::{discover_with_first, FragmentRef};
use crate::error::{IoContext, QrftError, Result};
use crate::fragment::{create_dir_all, create_file};
use crate::header::{read_header, HASH_LEN, HEADER_LEN};
use crate::path_safety::output_path;
use crate::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};

const COPY_BUF: usize = 64 * 1024;

#[derive(Clone, Debug, Default)]
pub struct MergeConfig {
    /// Where the reconstructed file goes; the fragment directory when `None`.
    pub output_dir: Option<PathBuf>,
    /// Leave fragment files in place after a verified merge.
    pub keep_fragments: bool,
}

#[derive(Debug, Clone)]
pub struct MergeReport {
    pub output: PathBuf,
    pub fragments: usize,
    pub bytes: u64,
    /// Fragments that could not be removed after the merge succeeded.
    pub cleanup_failures: Vec<(PathBuf, String)>,
}

/// Rebuild the original file from the fragments in `dir`.
///
/// The reconstructed bytes are hashed as they are written and compared with
/// the digest stored in fragment 0. Fragments are removed only after a match;
/// on mismatch both the fragments and the bad output are left on disk.
pub fn merge_fragments(dir: &Path, cfg: &MergeConfig) -> Result<MergeReport> {
    let fragments = discover_with_first(dir)?;
    let meta = read_header(&fragments[0].path)?;

    let out_dir = match cfg.output_dir.as_deref() {
        Some(d) => {
            create_dir_all(d, DEFAULT_DIR_MODE)?;
            d
        }
        None => dir,
    };
    let output = output_path(out_dir, meta.name_bytes())?;
    let same_dir = fs::canonicalize(out_dir).io_ctx("resolve", out_dir)?
        == fs::canonicalize(dir).io_ctx("resolve", dir)?;
    if same_dir && fragments.iter().any(|f| f.path.file_name() == output.file_name()) {
        return Err(QrftError::Validation(format!(
            "recovered file name {output:?} would overwrite a fragment"
        )));
    }

    let (digest, bytes) = {
        let mut out = BufWriter::new(create_file(&output, DEFAULT_FILE_MODE)?);
        let res = copy_fragments(&fragments, &mut out, &output)?;
        out.flush().io_ctx("flush", &output)?;
        res
    };

    if digest != meta.hash {
        let err = QrftError::Integrity {
            expected: meta.hash_hex(),
            actual: hex::encode(digest),
            output: output.clone(),
        };
        warn!(dir = ?dir, "{err}");
        return Err(err);
    }
    if bytes != meta.size as u64 {
        // Digest matched, so the header size field is the odd one out.
        warn!(expected = meta.size, actual = bytes, "header size disagrees with merged length");
    }

    let mut cleanup_failures = Vec::new();
    if !cfg.keep_fragments {
        for f in &fragments {
            if let Err(e) = fs::remove_file(&f.path) {
                warn!(path = ?f.path, error = %e, "failed to remove fragment");
                cleanup_failures.push((f.path.clone(), e.to_string()));
            }
        }
    }

    info!(output = ?output, fragments = fragments.len(), bytes, "merge successful");
    Ok(MergeReport { output, fragments: fragments.len(), bytes, cleanup_failures })
}

/// Stream every fragment, in the given order, into `sink` while hashing the
/// copied bytes. The header of fragment 0 is skipped.
pub(crate) fn copy_fragments<W: Write>(
    fragments: &[FragmentRef],
    sink: &mut W,
    sink_path: &Path,
) -> Result<([u8; HASH_LEN], u64)> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; COPY_BUF];
    let mut total = 0u64;
    for frag in fragments {
        let mut f = File::open(&frag.path).io_ctx("open", &frag.path)?;
        if frag.is_first {
            f.seek(SeekFrom::Start(HEADER_LEN as u64)).io_ctx("seek past header", &frag.path)?;
        }
        let mut copied = 0u64;
        loop {
            let n = match f.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(QrftError::Io { op: "read", path: frag.path.clone(), source: e })
                }
            };
            hasher.update(&buf[..n]);
            sink.write_all(&buf[..n]).io_ctx("write", sink_path)?;
            copied += n as u64;
        }
        debug!(index = frag.index, bytes = copied, "copied fragment");
        total += copied;
    }
    Ok((hasher.finalize().into(), total))
}
