//! SPDX-FileCopyrightText: 2025 CyberDeco, 2015 Norbyte (LSLib, MIT), 2023 saghm (xiba, Apache-2.0)
//!
//! SPDX-License-Identifier: MIT AND Apache-2.0
//!
//! LSPK PAK file format reader
//!
//! Reading is split into stages that each work on the fully buffered archive:
//! [`read_header`] detects the header variant, [`decode_directory`] recovers the
//! file table and [`EntryExtractor`] pulls a single member back out.

mod directory;
mod extractor;
mod header;
mod layout;
mod types;

pub use directory::{decode_directory, decode_directory_with_diagnostics};
pub use extractor::{DecompressTrigger, EntryExtractor, ExtractedMember, needs_decompression};
pub use header::{read_header, read_header_with_diagnostics};
pub use layout::{
    EntryLayout, FieldWidth, LayoutField, MAX_PLAUSIBLE_STRIDE, MIN_PLAUSIBLE_STRIDE, StrideChoice,
    infer_stride, layout_for_version,
};
pub use types::*;

/// LSPK magic bytes
pub const MAGIC: [u8; 4] = [b'L', b'S', b'P', b'K'];

/// LSPK signature read as a little-endian `u32`
pub const SIGNATURE: u32 = 0x4B50534C;

/// Smallest buffer that can hold any header variant
pub const MIN_FILE_SIZE: usize = 12;

/// Size of the fixed header at the start of legacy (v10) archives
pub const LEADING_HEADER_SIZE: usize = 32;

/// Minimum body length of a trailing header (excluding size and signature)
pub const TRAILING_HEADER_MIN_BODY: usize = 28;

/// Static prologue before member data in legacy archives
pub const LEGACY_DATA_OFFSET: u32 = 280;

/// First version whose members are addressed without the legacy data offset
pub const MODERN_VERSION: u32 = 13;

/// Length of file path in table entry
pub const PATH_LENGTH: usize = 256;

/// Nominal upper bound of a table record, used to size the table decompression
pub const NOMINAL_ENTRY_SIZE: usize = 300;
