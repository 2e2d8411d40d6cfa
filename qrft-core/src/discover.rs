use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use globset::{Glob, GlobMatcher};
use tracing::debug;

use crate::error::{QrftError, Result};
use crate::FRAGMENT_EXT;

/// A fragment file recognised by name. Rebuilt on every scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentRef {
    pub is_first: bool,
    pub path: PathBuf,
    pub index: u32,
}

/// Matches `<base>_<4 digits>.part` and extracts the ordinal.
pub struct FragmentMatcher {
    glob: GlobMatcher,
}

impl FragmentMatcher {
    pub fn new() -> Result<Self> {
        let pattern = format!("*_[0-9][0-9][0-9][0-9].{FRAGMENT_EXT}");
        let glob = Glob::new(&pattern)
            .map_err(|e| QrftError::Discovery(format!("bad fragment pattern: {e}")))?
            .compile_matcher();
        Ok(Self { glob })
    }

    pub fn parse(&self, file_name: &str) -> Option<u32> {
        if !self.glob.is_match(file_name) {
            return None;
        }
        let stem = file_name.strip_suffix(FRAGMENT_EXT)?.strip_suffix('.')?;
        stem.get(stem.len().checked_sub(4)?..)?.parse().ok()
    }
}

/// Process-wide matcher, compiled on first use.
fn shared_matcher() -> Result<&'static FragmentMatcher> {
    static MATCHER: OnceLock<std::result::Result<FragmentMatcher, String>> = OnceLock::new();
    MATCHER
        .get_or_init(|| FragmentMatcher::new().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| QrftError::Discovery(e.clone()))
}

/// Ordinal of a fragment file name, or `None` if the name is not a fragment.
pub fn parse_fragment_name(file_name: &str) -> Option<u32> {
    shared_matcher().ok()?.parse(file_name)
}

/// Keep the fragment paths from `paths` and sort them by ordinal. Listing
/// order does not matter; two files claiming one ordinal is an error.
pub fn order_fragments<I>(paths: I) -> Result<Vec<FragmentRef>>
where
    I: IntoIterator<Item = PathBuf>,
{
    let matcher = shared_matcher()?;
    let mut out: Vec<FragmentRef> = paths
        .into_iter()
        .filter_map(|path| {
            let index = path.file_name()?.to_str().and_then(|n| matcher.parse(n))?;
            Some(FragmentRef { is_first: index == 0, path, index })
        })
        .collect();
    out.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.path.cmp(&b.path)));
    if let Some(w) = out.windows(2).find(|w| w[0].index == w[1].index) {
        return Err(QrftError::Discovery(format!(
            "ordinal {} claimed by both {:?} and {:?}",
            w[0].index, w[0].path, w[1].path
        )));
    }
    Ok(out)
}

/// Scan `dir` (non-recursively) for fragment files, sorted by ordinal.
pub fn discover(dir: &Path) -> Result<Vec<FragmentRef>> {
    let mut files = Vec::new();
    for ent in walkdir::WalkDir::new(dir).min_depth(1).max_depth(1) {
        let ent = ent.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            match e.into_io_error() {
                Some(source) => QrftError::Io { op: "read dir", path, source },
                None => QrftError::Discovery(format!("cannot walk {path:?}")),
            }
        })?;
        if !ent.file_type().is_file() {
            continue;
        }
        files.push(ent.into_path());
    }
    let fragments = order_fragments(files)?;
    if fragments.is_empty() {
        return Err(QrftError::Discovery(format!("no fragments found in {dir:?}")));
    }
    debug!(count = fragments.len(), dir = ?dir, "discovered fragments");
    Ok(fragments)
}

/// Like [`discover`], but also requires ordinal 0 to be present.
pub fn discover_with_first(dir: &Path) -> Result<Vec<FragmentRef>> {
    let fragments = discover(dir)?;
    if !fragments.iter().any(|f| f.is_first) {
        return Err(QrftError::Discovery(format!(
            "first fragment (index 0) not found in {dir:?}"
        )));
    }
    Ok(fragments)
}
