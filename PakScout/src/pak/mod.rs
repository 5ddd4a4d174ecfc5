//! PAK archive module

mod archive;
mod batch;
pub mod lspk;
mod operations;
mod scan_options;

// Primary public API
pub use archive::{ArchiveReader, SharedDiagnostics};
pub use operations::{extract_member, list_members};

// Re-export public LSPK types
pub use lspk::{
    DirectoryEntry, EntryExtractor, ExtractedMember, HeaderVariant, PackageHeader, PakPhase,
    PakProgress,
};

// Re-export batch operations
pub use batch::{
    ArchiveScan, ArchiveSummary, BatchScanResult, find_pak_files, scan_archive, scan_archives,
    scan_directory,
};
pub use scan_options::{DEFAULT_MAX_DEPTH, DEFAULT_META_FILE, ScanOptions};

/// Progress callback for batch operations.
///
/// Receives a [`PakProgress`] struct with phase, current/total counts, and optional filename.
/// Must be `Sync + Send` because it is called from the scan workers.
pub type ProgressCallback<'a> = &'a (dyn Fn(&PakProgress) + Sync + Send);
