//! Buffered archive reader
//!
//! [`ArchiveReader`] reads a whole PAK into memory, detects its header and
//! decodes the file table once. Members are then extracted from the buffer on
//! demand; the cached header and table are never modified.

use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::lspk::{
    DirectoryEntry, EntryExtractor, ExtractedMember, HeaderVariant, PackageHeader,
    decode_directory_with_diagnostics, read_header_with_diagnostics,
};
use crate::diagnostics::{PakDiagnostic, ignore_diagnostics};
use crate::error::{Error, Result};

/// Diagnostic sink owned by an [`ArchiveReader`]
pub type SharedDiagnostics = Arc<dyn Fn(&PakDiagnostic) + Send + Sync>;

/// A PAK archive held in memory with its decoded file table.
///
/// # Example
///
/// ```no_run
/// use pakscout::pak::ArchiveReader;
///
/// let archive = ArchiveReader::open("MyMod.pak")?;
/// for name in archive.list_members() {
///     println!("{name}");
/// }
/// let meta = archive.extract("Mods/MyMod/meta.lsx");
/// # Ok::<(), pakscout::Error>(())
/// ```
pub struct ArchiveReader {
    path: Option<PathBuf>,
    data: Vec<u8>,
    header: PackageHeader,
    entries: Vec<DirectoryEntry>,
    diagnostics: SharedDiagnostics,
}

impl ArchiveReader {
    /// Read the archive at `path` and decode its file table.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Format`]
    /// if no usable header is found. An unreadable file table is not an error;
    /// the archive simply has no members.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_diagnostics(path, ignore_diagnostics)
    }

    /// Same as [`open`](Self::open), reporting diagnostics for this archive to `diagnostics`.
    ///
    /// # Errors
    /// See [`open`](Self::open).
    pub fn open_with_diagnostics<P, F>(path: P, diagnostics: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: Fn(&PakDiagnostic) + Send + Sync + 'static,
    {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        tracing::debug!("Read {} ({} bytes)", path.display(), data.len());
        Self::build(Some(path.to_path_buf()), data, Arc::new(diagnostics))
    }

    /// Decode an archive that is already in memory.
    ///
    /// # Errors
    /// Returns [`Error::Format`] if no usable header is found.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::build(None, data, Arc::new(ignore_diagnostics))
    }

    /// Same as [`from_bytes`](Self::from_bytes) with a diagnostic sink.
    ///
    /// # Errors
    /// See [`from_bytes`](Self::from_bytes).
    pub fn from_bytes_with_diagnostics(
        data: Vec<u8>,
        diagnostics: SharedDiagnostics,
    ) -> Result<Self> {
        Self::build(None, data, diagnostics)
    }

    fn build(path: Option<PathBuf>, data: Vec<u8>, diagnostics: SharedDiagnostics) -> Result<Self> {
        let header = read_header_with_diagnostics(&data, &*diagnostics)?;
        let entries = decode_directory_with_diagnostics(&data, &header, &*diagnostics);

        tracing::debug!(
            "PAK v{} ({} header): {} of {} entries decoded",
            header.version,
            header.variant.as_str(),
            entries.len(),
            header.entry_count
        );

        Ok(Self {
            path,
            data,
            header,
            entries,
            diagnostics,
        })
    }

    /// Path the archive was opened from, if any
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn header(&self) -> &PackageHeader {
        &self.header
    }

    #[must_use]
    pub fn version(&self) -> u32 {
        self.header.version
    }

    #[must_use]
    pub fn variant(&self) -> HeaderVariant {
        self.header.variant
    }

    /// Decoded table entries in table order
    #[must_use]
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Size of the buffered archive in bytes
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.data.len()
    }

    /// Names of all decoded members in table order
    #[must_use]
    pub fn list_members(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// Find a member by path, ignoring case
    #[must_use]
    pub fn find_entry(&self, name: &str) -> Option<&DirectoryEntry> {
        let wanted = name.to_lowercase();
        self.entries.iter().find(|e| e.name.to_lowercase() == wanted)
    }

    /// Find a member by its exact path
    #[must_use]
    pub fn find_entry_exact(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// First member (in table order) whose path ends with `suffix`, ignoring case.
    ///
    /// Used to locate `meta.lsx` without knowing the mod folder name.
    #[must_use]
    pub fn find_member_by_suffix(&self, suffix: &str) -> Option<&DirectoryEntry> {
        let suffix = suffix.to_lowercase();
        self.entries
            .iter()
            .find(|e| e.name.to_lowercase().ends_with(&suffix))
    }

    /// First member (in table order) whose final path component is `file_name`, ignoring case.
    #[must_use]
    pub fn find_member_by_file_name(&self, file_name: &str) -> Option<&DirectoryEntry> {
        let wanted = file_name.to_lowercase();
        self.entries.iter().find(|e| {
            let name = e.name.rsplit(['/', '\\']).next().unwrap_or(&e.name);
            name.to_lowercase() == wanted
        })
    }

    /// Extract a member by path, ignoring case. `None` if it is not in the table.
    #[must_use]
    pub fn extract(&self, name: &str) -> Option<Vec<u8>> {
        let entry = self.find_entry(name)?;
        self.extract_logged(entry)
    }

    /// Extract a member by its exact path. `None` if it is not in the table.
    #[must_use]
    pub fn extract_exact(&self, name: &str) -> Option<Vec<u8>> {
        let entry = self.find_entry_exact(name)?;
        self.extract_logged(entry)
    }

    /// Extract a member by path (ignoring case), keeping extraction details.
    ///
    /// # Errors
    /// Returns [`Error::MemberNotFound`] if no entry matches `name`.
    pub fn extract_detailed(&self, name: &str) -> Result<ExtractedMember> {
        let entry = self
            .find_entry(name)
            .ok_or_else(|| Error::MemberNotFound(name.to_string()))?;
        self.extract_entry(entry)
    }

    /// Extract the member described by `entry`.
    ///
    /// # Errors
    /// Only fails on I/O errors, which cannot occur for an in-memory buffer.
    pub fn extract_entry(&self, entry: &DirectoryEntry) -> Result<ExtractedMember> {
        let mut source = Cursor::new(self.data.as_slice());
        EntryExtractor::with_diagnostics(&self.header, &*self.diagnostics)
            .extract(&mut source, entry)
    }

    /// Stored bytes of `entry` exactly as they sit in the archive, without decompression.
    ///
    /// # Errors
    /// Returns [`Error::TruncatedData`] if the entry reaches past the end of the buffer.
    pub fn stored_bytes(&self, entry: &DirectoryEntry) -> Result<&[u8]> {
        let available = self.data.len() as u64;
        let truncated = || Error::TruncatedData {
            offset: entry.offset,
            requested: entry.size_on_disk,
            available,
        };

        let start = entry
            .offset
            .checked_add(self.header.member_base_offset())
            .ok_or_else(truncated)?;
        let end = start.checked_add(entry.size_on_disk).ok_or_else(truncated)?;
        if end > available {
            return Err(truncated());
        }
        Ok(&self.data[start as usize..end as usize])
    }

    fn extract_logged(&self, entry: &DirectoryEntry) -> Option<Vec<u8>> {
        match self.extract_entry(entry) {
            Ok(member) => Some(member.data),
            Err(e) => {
                tracing::warn!("Failed to extract {}: {}", entry.name, e);
                None
            }
        }
    }
}

impl fmt::Debug for ArchiveReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveReader")
            .field("path", &self.path)
            .field("file_size", &self.data.len())
            .field("header", &self.header)
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}
