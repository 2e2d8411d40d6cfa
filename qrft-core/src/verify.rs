use crate::discover::discover_with_first;
use crate::error::Result;
use crate::header::{read_header, Metadata};
use crate::merge::copy_fragments;
use crate::MAX_CHUNKS;
use std::collections::BTreeSet;
use std::io;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub fragments: usize,
    pub declared_total: u32,
    /// Ordinals below `declared_total` with no fragment on disk.
    pub missing: Vec<u32>,
    pub bytes: u64,
    pub size_ok: bool,
    pub hash_ok: bool,
    pub metadata: Metadata,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.missing.is_empty() && self.size_ok && self.hash_ok
    }
}

/// Hash the fragments in `dir` the way a merge would, without writing or
/// removing anything.
pub fn verify(dir: &Path) -> Result<VerifyReport> {
    let fragments = discover_with_first(dir)?;
    let metadata = read_header(&fragments[0].path)?;
    let present: BTreeSet<u32> = fragments.iter().map(|f| f.index).collect();
    let missing =
        (0..metadata.total.min(MAX_CHUNKS as u32)).filter(|i| !present.contains(i)).collect();
    let (digest, bytes) = copy_fragments(&fragments, &mut io::sink(), dir)?;
    Ok(VerifyReport {
        fragments: fragments.len(),
        declared_total: metadata.total,
        missing,
        bytes,
        size_ok: bytes == metadata.size as u64,
        hash_ok: digest == metadata.hash,
        metadata,
    })
}
