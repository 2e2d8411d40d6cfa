pub mod discover;
pub mod error;
pub mod fragment;
pub mod header;
pub mod merge;
pub mod path_safety;
pub mod split;
pub mod value;
pub mod verify;

pub use error::{QrftError, Result};

/// Smallest chunk count a split accepts.
pub const MIN_CHUNKS: usize = 2;
/// Largest chunk count a split accepts; ordinals are exactly four digits.
pub const MAX_CHUNKS: usize = 10_000;

pub const DEFAULT_FILE_MODE: u32 = 0o644;
pub const DEFAULT_DIR_MODE: u32 = 0o755;

pub const FRAGMENT_EXT: &str = "part";
pub const TEMP_EXT: &str = "tmp";
