//! File table decoding
//!
//! The table lives at `directory_offset` as `[u32 entry count][u32 compressed size][LZ4 data]`.
//! Decoding never fails: whatever cannot be read is reported and skipped.

use byteorder::{ByteOrder, LittleEndian};

use super::layout::{StrideChoice, infer_stride, layout_for_version};
use super::{DirectoryEntry, NOMINAL_ENTRY_SIZE, PackageHeader};
use crate::compression::decompress_with_diagnostics;
use crate::diagnostics::{DiagnosticCallback, PakDiagnostic, ignore_diagnostics, report};

/// Decode the file table of a buffered archive.
///
/// Returns every well-formed record in table order. An unreadable table
/// yields an empty list.
#[must_use]
pub fn decode_directory(data: &[u8], header: &PackageHeader) -> Vec<DirectoryEntry> {
    decode_directory_with_diagnostics(data, header, &ignore_diagnostics)
}

/// Same as [`decode_directory`], reporting skipped records and fallbacks to `diagnostics`.
#[must_use]
pub fn decode_directory_with_diagnostics(
    data: &[u8],
    header: &PackageHeader,
    diagnostics: DiagnosticCallback,
) -> Vec<DirectoryEntry> {
    let unreadable = |reason: String| {
        report(diagnostics, PakDiagnostic::DirectoryUnreadable { reason });
        Vec::new()
    };

    let Some(table) = locate_table(data, header.directory_offset) else {
        return unreadable(format!(
            "file table at {} lies beyond end of file ({} bytes)",
            header.directory_offset,
            data.len()
        ));
    };

    let (entry_count, compressed) = match table {
        Ok(table) => table,
        Err((start, size)) => {
            return unreadable(format!(
                "compressed table of {size} bytes at {start} extends beyond end of file ({} bytes)",
                data.len()
            ));
        }
    };

    let expected = entry_count.saturating_mul(NOMINAL_ENTRY_SIZE);
    let decompressed = match decompress_with_diagnostics(compressed, Some(expected), diagnostics) {
        Ok(table) => table,
        Err(e) => return unreadable(e.to_string()),
    };

    let choice = infer_stride(decompressed.len(), entry_count, header.version);
    match choice {
        StrideChoice::Inferred(stride) => {
            report(diagnostics, PakDiagnostic::StrideInferred { stride });
        }
        StrideChoice::Fallback { calculated, stride } => report(
            diagnostics,
            PakDiagnostic::StrideFallback {
                calculated,
                stride,
                version: header.version,
            },
        ),
    }
    let stride = choice.stride();
    let layout = layout_for_version(header.version);

    let record_count = entry_count.min(decompressed.len() / stride);
    let mut entries = Vec::with_capacity(record_count);

    for (index, record) in decompressed.chunks_exact(stride).take(record_count).enumerate() {
        match layout.parse(record) {
            Ok(entry) => entries.push(entry),
            Err(reason) => report(diagnostics, PakDiagnostic::RecordDropped { index, reason }),
        }
    }

    entries
}

/// Slice out the compressed table.
///
/// `None` when the 8-byte table prefix is out of bounds; `Err((start, size))` when
/// the compressed payload it announces is.
#[allow(clippy::type_complexity)]
fn locate_table(
    data: &[u8],
    directory_offset: u64,
) -> Option<Result<(usize, &[u8]), (usize, usize)>> {
    let start = usize::try_from(directory_offset).ok()?;
    let prefix_end = start.checked_add(8)?;
    let prefix = data.get(start..prefix_end)?;

    let entry_count = LittleEndian::read_u32(&prefix[..4]) as usize;
    let compressed_size = LittleEndian::read_u32(&prefix[4..]) as usize;

    Some(
        prefix_end
            .checked_add(compressed_size)
            .and_then(|end| data.get(prefix_end..end))
            .map(|compressed| (entry_count, compressed))
            .ok_or((prefix_end, compressed_size)),
    )
}
