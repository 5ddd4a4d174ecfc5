//! # PakScout
//!
//! A tolerant, pure-Rust reader for Larian Studios LSPK package archives (`.pak`).
//!
//! PakScout finds the header wherever the archive's generation put it, recovers
//! the file table even when its record width is not what the version suggests,
//! and extracts single members whether they are stored raw or LZ4 compressed.
//! Damaged input degrades to fewer members or raw bytes instead of failing.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pakscout::pak::ArchiveReader;
//!
//! let archive = ArchiveReader::open("MyMod.pak")?;
//! println!("{} members", archive.list_members().len());
//!
//! if let Some(meta) = archive.extract("mods/mymod/META.LSX") {
//!     println!("meta.lsx is {} bytes", meta.len());
//! }
//! # Ok::<(), pakscout::Error>(())
//! ```
//!
//! ### Scanning a Mods Folder
//!
//! ```no_run
//! use pakscout::prelude::*;
//!
//! let options = ScanOptions::new().with_max_workers(4);
//! let result = scan_directory("Mods", &options, &|progress| {
//!     println!("{}: {}/{}", progress.phase.as_str(), progress.current, progress.total);
//! })?;
//! println!("{} ok, {} failed", result.success_count, result.fail_count);
//! println!("{}", result.to_json()?);
//! # Ok::<(), pakscout::Error>(())
//! ```
//!
//! ## Diagnostics
//!
//! The library never installs a `tracing` subscriber. Every stage emits leveled
//! `tracing` events and can also report [`PakDiagnostic`](diagnostics::PakDiagnostic)
//! values to a caller-supplied callback.
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `pakscout` command-line binary

pub mod compression;
pub mod diagnostics;
pub mod error;
pub mod pak;

// Re-exports for convenience
pub use error::{Error, FormatError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::diagnostics::{DiagnosticCallback, PakDiagnostic};
    pub use crate::error::{Error, FormatError, Result};

    pub use crate::pak::{
        ArchiveReader, DirectoryEntry, HeaderVariant, PackageHeader, extract_member, list_members,
    };

    // Batch scanning
    pub use crate::pak::{
        BatchScanResult, PakPhase, PakProgress, ProgressCallback, ScanOptions, find_pak_files,
        scan_archives, scan_directory,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;
