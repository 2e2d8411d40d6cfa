use crate::error::{IoContext, Result};
use crate::{FRAGMENT_EXT, TEMP_EXT};
use std::fs::{DirBuilder, File, OpenOptions};
use std::path::Path;

/// Standard fragment filename for ordinal `index`.
pub fn fragment_name(base: &str, index: usize) -> String {
    format!("{base}_{index:04}.{FRAGMENT_EXT}")
}

/// Name fragment 0 carries until its header has been embedded.
pub fn temp_name(base: &str) -> String {
    format!("{base}_{:04}.{TEMP_EXT}", 0)
}

/// Create (or truncate) a fragment/output file with the given permission bits.
pub fn create_file(path: &Path, mode: u32) -> Result<File> {
    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    opts.open(path).io_ctx("create", path)
}

pub fn create_dir_all(path: &Path, mode: u32) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path).io_ctx("create dir", path)
}
