//! Options for batch archive scans

use serde::{Deserialize, Serialize};

/// Default walk depth: the folder itself and one level of subfolders
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Default member looked up in every scanned archive
pub const DEFAULT_META_FILE: &str = "meta.lsx";

/// Options controlling [`scan_archives`](super::scan_archives) and
/// [`find_pak_files`](super::find_pak_files).
///
/// # Example
///
/// ```
/// use pakscout::pak::ScanOptions;
///
/// let options = ScanOptions::new()
///     .with_max_workers(4)
///     .with_max_depth(1)
///     .with_read_meta(false);
/// assert!(options.worker_count() <= 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Upper bound on parallel workers. `None` uses every available core.
    /// Always clamped to the number of available cores.
    pub max_workers: Option<usize>,

    /// Maximum directory depth searched for `.pak` files (1 = the folder only)
    pub max_depth: usize,

    /// Member whose bytes are captured for each archive, compared case-insensitively
    /// against the final path component of every member
    pub meta_file_name: String,

    /// Capture the metadata member's bytes at all
    pub read_meta: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_workers: None,
            max_depth: DEFAULT_MAX_DEPTH,
            meta_file_name: DEFAULT_META_FILE.to_string(),
            read_meta: true,
        }
    }

    #[must_use]
    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = Some(workers);
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn with_meta_file_name(mut self, name: impl Into<String>) -> Self {
        self.meta_file_name = name.into();
        self
    }

    #[must_use]
    pub fn with_read_meta(mut self, read: bool) -> Self {
        self.read_meta = read;
        self
    }

    /// Number of workers a scan will use: `max_workers` clamped to `1..=cores`.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        let cores = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        self.max_workers.unwrap_or(cores).clamp(1, cores)
    }
}
