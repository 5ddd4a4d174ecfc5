//! Types for LSPK PAK file handling
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`, 2015 Norbyte (`LSLib`, MIT), 2023 saghm (xiba, Apache-2.0)
//!
//! SPDX-License-Identifier: MIT AND Apache-2.0

use serde::Serialize;

use super::MODERN_VERSION;

/// Where the fixed-size header lives in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderVariant {
    /// Header sits at the end of the file, followed by its size and the signature (v13+)
    Trailing,
    /// Header sits at the start of the file (legacy v10 layout)
    Leading,
}

impl HeaderVariant {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trailing => "trailing",
            Self::Leading => "leading",
        }
    }
}

/// Normalized header of an LSPK PAK file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageHeader {
    /// Signature, always [`super::SIGNATURE`] once parsed
    pub signature: u32,
    /// Format version
    pub version: u32,
    /// Absolute offset of the file table
    pub directory_offset: u64,
    /// Compressed size of the file table as recorded in the header
    pub directory_compressed_size: u32,
    /// Number of files as recorded in the header
    pub entry_count: u32,
    /// Added to every member offset in legacy archives (0 for trailing headers)
    pub data_base_offset: u32,
    /// Which header layout was detected
    pub variant: HeaderVariant,
}

impl PackageHeader {
    /// Offset added to a table entry's stored offset to get its position in the file
    #[must_use]
    pub fn member_base_offset(&self) -> u64 {
        if self.version < MODERN_VERSION {
            u64::from(self.data_base_offset)
        } else {
            0
        }
    }
}

/// Entry in the file table describing a file in the PAK
///
/// Only records with a non-empty name and a non-zero offset are ever constructed
/// by the directory decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    /// Path of the file within the archive
    pub name: String,
    /// Offset of the stored data, before the legacy base offset is applied
    pub offset: u64,
    /// Number of bytes stored in the archive
    pub size_on_disk: u64,
    /// Size after decompression (equal to `size_on_disk` for stored files)
    pub uncompressed_size: u64,
    /// Archive part number (0 = main .pak).
    ///
    /// For v18+ tables this shares its bytes with `uncompressed_size` and is not
    /// meaningful on its own.
    pub archive_part: u32,
    /// Raw flags
    pub flags: u32,
}

impl DirectoryEntry {
    /// True when the table records differing stored and decompressed sizes
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.uncompressed_size > 0 && self.size_on_disk != self.uncompressed_size
    }
}

/// Progress information during batch PAK operations
#[derive(Debug, Clone)]
pub struct PakProgress {
    /// Current operation phase
    pub phase: PakPhase,
    /// Current item number (1-indexed)
    pub current: usize,
    /// Total number of items
    pub total: usize,
    /// Current file being processed (if applicable)
    pub current_file: Option<String>,
}

impl PakProgress {
    /// Create a new progress update
    #[must_use]
    pub fn new(phase: PakPhase, current: usize, total: usize) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: None,
        }
    }

    /// Create a progress update with a file/item name
    #[must_use]
    pub fn with_file(
        phase: PakPhase,
        current: usize,
        total: usize,
        file: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            current,
            total,
            current_file: Some(file.into()),
        }
    }
}

/// Phase of PAK operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PakPhase {
    /// Looking for PAK files in a folder
    Discovering,
    /// Opening an archive and decoding its file table
    ReadingTable,
    /// Extracting a member
    Extracting,
    /// Operation complete
    Complete,
}

impl PakPhase {
    /// Get a human-readable description of this phase
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discovering => "Discovering packages",
            Self::ReadingTable => "Reading file table",
            Self::Extracting => "Extracting",
            Self::Complete => "Complete",
        }
    }
}
