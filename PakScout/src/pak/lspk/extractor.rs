//! Single member extraction
//!
//! Reads the stored bytes of one table entry and decides whether they need
//! decompressing. Extraction degrades instead of failing: short reads return
//! what was read and failed decompression returns the raw bytes.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::{DirectoryEntry, PackageHeader};
use crate::compression::{LZ4_FRAME_MAGIC, decompress_with_diagnostics};
use crate::diagnostics::{DiagnosticCallback, PakDiagnostic, ignore_diagnostics, report};
use crate::error::Result;

/// Bytes checked for non-printable characters
const BINARY_SNIFF_LEN: usize = 50;

/// Bytes searched for a `<` that marks XML/LSX text
const MARKUP_SNIFF_LEN: usize = 100;

/// Why a member was handed to the decompressor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressTrigger {
    /// Stored and decompressed sizes differ
    SizeMismatch,
    /// Data starts with the LZ4 frame magic
    FrameMagic,
    /// Data looks binary and not like markup. Probabilistic.
    BinarySniff,
}

/// Decide whether `data` read for `entry` should be decompressed.
///
/// Checks run from most to least authoritative and the first match wins.
#[must_use]
pub fn needs_decompression(entry: &DirectoryEntry, data: &[u8]) -> Option<DecompressTrigger> {
    if entry.is_compressed() {
        return Some(DecompressTrigger::SizeMismatch);
    }
    if data.len() <= 4 {
        return None;
    }
    if data.starts_with(&LZ4_FRAME_MAGIC) {
        return Some(DecompressTrigger::FrameMagic);
    }
    if looks_binary(data) {
        return Some(DecompressTrigger::BinarySniff);
    }
    None
}

fn looks_binary(data: &[u8]) -> bool {
    let head = &data[..data.len().min(BINARY_SNIFF_LEN)];
    let markup = &data[..data.len().min(MARKUP_SNIFF_LEN)];
    head.iter().any(|b| !(0x20..=0x7E).contains(b)) && !markup.contains(&b'<')
}

/// A member read from an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMember {
    /// Best available bytes: decompressed if that succeeded, raw otherwise
    pub data: Vec<u8>,
    /// Fewer bytes were stored than the entry declares
    pub short_read: bool,
    /// Why decompression was attempted, if it was
    pub trigger: Option<DecompressTrigger>,
    /// The decompressor accepted the data (including plain-text passthrough)
    pub decompressed: bool,
}

/// Reads members described by a decoded file table.
pub struct EntryExtractor<'a> {
    header: &'a PackageHeader,
    diagnostics: DiagnosticCallback<'a>,
}

impl<'a> EntryExtractor<'a> {
    #[must_use]
    pub fn new(header: &'a PackageHeader) -> Self {
        Self {
            header,
            diagnostics: &ignore_diagnostics,
        }
    }

    #[must_use]
    pub fn with_diagnostics(
        header: &'a PackageHeader,
        diagnostics: DiagnosticCallback<'a>,
    ) -> Self {
        Self {
            header,
            diagnostics,
        }
    }

    /// Open the archive at `pak_path` and extract `entry` from it.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if the file cannot be opened or read.
    pub fn extract_from_path<P: AsRef<Path>>(
        &self,
        pak_path: P,
        entry: &DirectoryEntry,
    ) -> Result<ExtractedMember> {
        let mut reader = BufReader::new(File::open(pak_path)?);
        self.extract(&mut reader, entry)
    }

    /// Extract `entry` from any seekable source holding the whole archive.
    ///
    /// # Errors
    /// Returns [`crate::Error::Io`] if seeking or reading fails. Short data and
    /// failed decompression are not errors.
    pub fn extract<R: Read + Seek>(
        &self,
        source: &mut R,
        entry: &DirectoryEntry,
    ) -> Result<ExtractedMember> {
        let mut raw = Vec::new();
        if let Some(position) = entry.offset.checked_add(self.header.member_base_offset()) {
            source.seek(SeekFrom::Start(position))?;
            source.by_ref().take(entry.size_on_disk).read_to_end(&mut raw)?;
        }

        let short_read = (raw.len() as u64) < entry.size_on_disk;
        if short_read {
            report(
                self.diagnostics,
                PakDiagnostic::ShortRead {
                    name: entry.name.clone(),
                    requested: entry.size_on_disk,
                    read: raw.len() as u64,
                },
            );
        }

        let Some(trigger) = needs_decompression(entry, &raw) else {
            return Ok(ExtractedMember {
                data: raw,
                short_read,
                trigger: None,
                decompressed: false,
            });
        };

        let expected = usize::try_from(entry.uncompressed_size).ok();
        match decompress_with_diagnostics(&raw, expected, self.diagnostics) {
            Ok(data) => Ok(ExtractedMember {
                data,
                short_read,
                trigger: Some(trigger),
                decompressed: true,
            }),
            Err(e) => {
                report(
                    self.diagnostics,
                    PakDiagnostic::RawFallback {
                        name: entry.name.clone(),
                        reason: e.to_string(),
                    },
                );
                Ok(ExtractedMember {
                    data: raw,
                    short_read,
                    trigger: Some(trigger),
                    decompressed: false,
                })
            }
        }
    }
}
