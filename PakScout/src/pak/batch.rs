//! Batch PAK scanning
//!
//! This module discovers PAK files in a folder and scans them in parallel on a
//! bounded worker pool. Every archive is opened, summarised and dropped by one
//! worker, so at most `worker_count` archives are buffered at any time.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use super::{ArchiveReader, ProgressCallback, ScanOptions};
use super::lspk::{HeaderVariant, PakPhase, PakProgress};
use crate::error::Result;

/// What a scan learned about one archive
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveSummary {
    pub version: u32,
    pub variant: HeaderVariant,
    /// Number of entries decoded from the file table
    pub member_count: usize,
    /// Path of the metadata member inside the archive, if one was found
    pub meta_path: Option<String>,
    /// Size of the extracted metadata member
    pub meta_size: Option<usize>,
    /// Extracted metadata bytes, left uninterpreted
    #[serde(skip)]
    pub meta_bytes: Option<Vec<u8>>,
}

/// Outcome of scanning one archive. Exactly one of `summary` and `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveScan {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ArchiveSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ArchiveScan {
    fn from_result(path: PathBuf, result: Result<ArchiveSummary>) -> Self {
        match result {
            Ok(summary) => Self {
                path,
                summary: Some(summary),
                error: None,
            },
            Err(e) => Self {
                path,
                summary: None,
                error: Some(e.to_string()),
            },
        }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.summary.is_some()
    }
}

/// Result of a batch scan
#[derive(Debug, Clone, Serialize)]
pub struct BatchScanResult {
    /// Number of archives that opened successfully
    pub success_count: usize,
    /// Number of archives that could not be opened
    pub fail_count: usize,
    /// One record per input path, in input order
    pub archives: Vec<ArchiveScan>,
}

impl BatchScanResult {
    /// Pretty-printed JSON report. Metadata bytes are left out.
    ///
    /// # Errors
    /// Returns [`Error::Json`](crate::Error::Json) if serialisation fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Find all .pak files under `dir`, at most `max_depth` levels deep.
///
/// A depth of 1 searches `dir` itself only. Unreadable subdirectories are
/// skipped with a warning.
///
/// # Returns
/// A sorted list of paths to .pak files found in the directory tree.
///
/// # Errors
/// Returns [`Error::WalkDir`](crate::Error::WalkDir) if `dir` itself cannot be read.
pub fn find_pak_files<P: AsRef<Path>>(dir: P, max_depth: usize) -> Result<Vec<PathBuf>> {
    let mut pak_files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                tracing::warn!("Skipping unreadable path: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pak"))
        {
            pak_files.push(path.to_path_buf());
        }
    }

    pak_files.sort();
    Ok(pak_files)
}

/// Open one archive and summarise it.
///
/// # Errors
/// Returns an error if the archive cannot be read or carries no LSPK header.
pub fn scan_archive<P: AsRef<Path>>(path: P, options: &ScanOptions) -> Result<ArchiveSummary> {
    summarise(path.as_ref(), options, |_| {})
}

/// `before_extract` is called with the metadata member's path right before it is extracted.
fn summarise(
    path: &Path,
    options: &ScanOptions,
    before_extract: impl FnOnce(&str),
) -> Result<ArchiveSummary> {
    let archive = ArchiveReader::open(path)?;

    let meta = if options.read_meta {
        archive.find_member_by_file_name(&options.meta_file_name)
    } else {
        None
    };

    let (meta_path, meta_bytes) = match meta {
        Some(entry) => {
            before_extract(&entry.name);
            let bytes = archive.extract_entry(entry)?.data;
            (Some(entry.name.clone()), Some(bytes))
        }
        None => (None, None),
    };

    Ok(ArchiveSummary {
        version: archive.version(),
        variant: archive.variant(),
        member_count: archive.entries().len(),
        meta_path,
        meta_size: meta_bytes.as_ref().map(Vec::len),
        meta_bytes,
    })
}

/// Find every PAK under `dir` and scan them.
///
/// Reports [`PakPhase::Discovering`] before walking `dir`, then behaves like
/// [`scan_archives`].
///
/// # Errors
/// Returns [`Error::WalkDir`](crate::Error::WalkDir) if `dir` cannot be read and
/// [`Error::ThreadPool`](crate::Error::ThreadPool) if the worker pool cannot be created.
pub fn scan_directory<P: AsRef<Path>>(
    dir: P,
    options: &ScanOptions,
    progress: ProgressCallback,
) -> Result<BatchScanResult> {
    let dir = dir.as_ref();
    progress(&PakProgress::with_file(
        PakPhase::Discovering,
        0,
        0,
        dir.display().to_string(),
    ));

    let pak_files = find_pak_files(dir, options.max_depth)?;
    tracing::debug!("Found {} PAK files under {}", pak_files.len(), dir.display());
    scan_archives(&pak_files, options, progress)
}

/// Scan PAK files in parallel
///
/// Runs on a dedicated pool of [`ScanOptions::worker_count`] threads. A broken
/// archive is recorded in its [`ArchiveScan`] and never stops the batch.
///
/// # Arguments
/// * `pak_files` - List of PAK files to scan
/// * `options` - Worker bound and metadata lookup
/// * `progress` - Called with [`PakPhase::ReadingTable`] per archive,
///   [`PakPhase::Extracting`] per metadata member and [`PakPhase::Complete`] at the end
///
/// # Errors
/// Returns [`Error::ThreadPool`](crate::Error::ThreadPool) if the worker pool cannot be created.
pub fn scan_archives(
    pak_files: &[PathBuf],
    options: &ScanOptions,
    progress: ProgressCallback,
) -> Result<BatchScanResult> {
    let workers = options.worker_count();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("pakscout-scan-{i}"))
        .build()?;

    tracing::info!("Scanning {} archives on {} workers", pak_files.len(), workers);

    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = pak_files.len();

    let archives: Vec<ArchiveScan> = pool.install(|| {
        pak_files
            .par_iter()
            .map(|pak_path| {
                let display_name = pak_path
                    .file_name()
                    .map_or_else(|| pak_path.to_string_lossy(), |n| n.to_string_lossy())
                    .to_string();

                // Update progress (atomic)
                let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                progress(&PakProgress::with_file(
                    PakPhase::ReadingTable,
                    current,
                    total,
                    display_name,
                ));

                let result = summarise(pak_path, options, |member| {
                    progress(&PakProgress::with_file(
                        PakPhase::Extracting,
                        current,
                        total,
                        member,
                    ));
                });
                match &result {
                    Ok(_) => {
                        success_counter.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to scan {}: {}", pak_path.display(), e);
                        fail_counter.fetch_add(1, Ordering::SeqCst);
                    }
                }

                ArchiveScan::from_result(pak_path.clone(), result)
            })
            .collect()
    });

    progress(&PakProgress::new(PakPhase::Complete, total, total));

    Ok(BatchScanResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        archives,
    })
}
