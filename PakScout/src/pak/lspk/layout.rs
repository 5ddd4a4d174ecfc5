//! File table record layouts
//!
//! The table record format is reverse-engineered and varies by version. Each
//! known layout is described by an [`EntryLayout`]; [`layout_for_version`]
//! picks one and [`infer_stride`] decides how wide a record really is.

use byteorder::{ByteOrder, LittleEndian};

use super::{DirectoryEntry, PATH_LENGTH};
use crate::diagnostics::DropReason;

/// Computed record widths outside `(MIN, MAX)` are not trusted
pub const MIN_PLAUSIBLE_STRIDE: usize = 250;
pub const MAX_PLAUSIBLE_STRIDE: usize = 350;

/// Width of an integer field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldWidth {
    U32,
    U64,
}

impl FieldWidth {
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }
}

/// A little-endian integer at a fixed position inside a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutField {
    pub position: usize,
    pub width: FieldWidth,
}

impl LayoutField {
    const fn u32(position: usize) -> Self {
        Self {
            position,
            width: FieldWidth::U32,
        }
    }

    const fn u64(position: usize) -> Self {
        Self {
            position,
            width: FieldWidth::U64,
        }
    }

    /// One past the last byte of the field
    #[must_use]
    pub const fn end(&self) -> usize {
        self.position + self.width.bytes()
    }

    /// Read the field, or `None` if it does not fit in `record`
    #[must_use]
    pub fn read(&self, record: &[u8]) -> Option<u64> {
        let bytes = record.get(self.position..self.end())?;
        Some(match self.width {
            FieldWidth::U32 => u64::from(LittleEndian::read_u32(bytes)),
            FieldWidth::U64 => LittleEndian::read_u64(bytes),
        })
    }

    fn read_required(&self, record: &[u8]) -> Result<u64, DropReason> {
        self.read(record).ok_or(DropReason::FieldOutOfBounds {
            position: self.position,
            stride: record.len(),
        })
    }
}

/// Field positions of one table record format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLayout {
    /// Short label used in diagnostics
    pub label: &'static str,
    /// Lowest version this layout applies to
    pub min_version: u32,
    /// Record width used when it cannot be inferred
    pub default_stride: usize,
    pub offset: LayoutField,
    pub size_on_disk: LayoutField,
    pub uncompressed_size: LayoutField,
    /// Only read when the record is wide enough
    pub archive_part: Option<LayoutField>,
    /// Only read when the record is wide enough
    pub flags: Option<LayoutField>,
}

// v18 reads archive_part from the same bytes as uncompressed_size. Kept as found
// in real archives until samples tell the two apart.
const V18_LAYOUT: EntryLayout = EntryLayout {
    label: "v18",
    min_version: 18,
    default_stride: 296,
    offset: LayoutField::u32(256),
    size_on_disk: LayoutField::u32(264),
    uncompressed_size: LayoutField::u32(268),
    archive_part: Some(LayoutField::u32(268)),
    flags: None,
};

const V13_LAYOUT: EntryLayout = EntryLayout {
    label: "v13",
    min_version: 13,
    default_stride: 296,
    offset: LayoutField::u64(256),
    size_on_disk: LayoutField::u64(264),
    uncompressed_size: LayoutField::u64(272),
    archive_part: Some(LayoutField::u32(280)),
    flags: Some(LayoutField::u32(284)),
};

const LEGACY_LAYOUT: EntryLayout = EntryLayout {
    label: "v10",
    min_version: 0,
    default_stride: 272,
    offset: LayoutField::u64(256),
    size_on_disk: LayoutField::u32(264),
    uncompressed_size: LayoutField::u32(268),
    archive_part: None,
    flags: None,
};

/// Known layouts, newest first
static LAYOUTS: [&EntryLayout; 3] = [&V18_LAYOUT, &V13_LAYOUT, &LEGACY_LAYOUT];

/// Select the record layout for a PAK version
#[must_use]
pub fn layout_for_version(version: u32) -> &'static EntryLayout {
    LAYOUTS
        .iter()
        .copied()
        .find(|layout| version >= layout.min_version)
        .unwrap_or(&LEGACY_LAYOUT)
}

/// How the record width was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrideChoice {
    /// Table length divided by entry count fell inside the plausible window
    Inferred(usize),
    /// The division was implausible; the layout default is used
    Fallback { calculated: usize, stride: usize },
}

impl StrideChoice {
    #[must_use]
    pub fn stride(self) -> usize {
        match self {
            Self::Inferred(stride) | Self::Fallback { stride, .. } => stride,
        }
    }
}

/// Decide the record width of a decompressed file table.
///
/// The quotient `decompressed_len / entry_count` wins when it lies strictly
/// between [`MIN_PLAUSIBLE_STRIDE`] and [`MAX_PLAUSIBLE_STRIDE`]; otherwise
/// (trailing padding, unknown extra fields, zero entries) the version default
/// applies.
#[must_use]
pub fn infer_stride(decompressed_len: usize, entry_count: usize, version: u32) -> StrideChoice {
    let calculated = decompressed_len.checked_div(entry_count).unwrap_or(0);

    if calculated > MIN_PLAUSIBLE_STRIDE && calculated < MAX_PLAUSIBLE_STRIDE {
        StrideChoice::Inferred(calculated)
    } else {
        StrideChoice::Fallback {
            calculated,
            stride: layout_for_version(version).default_stride,
        }
    }
}

impl EntryLayout {
    /// Parse one record.
    ///
    /// # Errors
    /// Returns the reason the record must be dropped: an empty name, a required
    /// field that does not fit in the record, or a zero offset.
    pub fn parse(&self, record: &[u8]) -> Result<DirectoryEntry, DropReason> {
        let name_field = &record[..record.len().min(PATH_LENGTH)];
        let name_end = name_field
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(name_field.len());
        let name = String::from_utf8_lossy(&name_field[..name_end]).into_owned();
        if name.is_empty() {
            return Err(DropReason::EmptyName);
        }

        let offset = self.offset.read_required(record)?;
        let size_on_disk = self.size_on_disk.read_required(record)?;
        let uncompressed_size = self.uncompressed_size.read_required(record)?;
        let archive_part = optional_u32(self.archive_part, record);
        let flags = optional_u32(self.flags, record);

        if offset == 0 {
            return Err(DropReason::ZeroOffset);
        }

        Ok(DirectoryEntry {
            name,
            offset,
            size_on_disk,
            uncompressed_size,
            archive_part,
            flags,
        })
    }
}

fn optional_u32(field: Option<LayoutField>, record: &[u8]) -> u32 {
    field
        .and_then(|f| f.read(record))
        .map_or(0, |value| value as u32)
}
