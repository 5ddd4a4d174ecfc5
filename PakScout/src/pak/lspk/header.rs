//! LSPK header detection
//!
//! Modern archives (v13+) end with `[header body][u32 header size]["LSPK"]`;
//! legacy v10 archives start with `"LSPK"` followed by a fixed 32-byte header.

use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use super::{
    HeaderVariant, LEADING_HEADER_SIZE, LEGACY_DATA_OFFSET, MAGIC, MIN_FILE_SIZE, PackageHeader,
    SIGNATURE, TRAILING_HEADER_MIN_BODY,
};
use crate::diagnostics::{DiagnosticCallback, PakDiagnostic, ignore_diagnostics, report};
use crate::error::FormatError;

/// Detect the header variant and parse it.
///
/// The trailing variant is checked first. If its signature is present but the
/// header is unusable, the leading variant is tried before giving up.
///
/// # Errors
/// Returns [`FormatError::TooSmall`] for buffers shorter than a header,
/// [`FormatError::InvalidHeader`] for inconsistent header fields and
/// [`FormatError::UnrecognizedArchive`] when no signature is found.
pub fn read_header(data: &[u8]) -> Result<PackageHeader, FormatError> {
    read_header_with_diagnostics(data, &ignore_diagnostics)
}

/// Same as [`read_header`], reporting a rejected trailing header to `diagnostics`.
///
/// # Errors
/// See [`read_header`].
pub fn read_header_with_diagnostics(
    data: &[u8],
    diagnostics: DiagnosticCallback,
) -> Result<PackageHeader, FormatError> {
    if data.len() < MIN_FILE_SIZE {
        return Err(FormatError::TooSmall {
            len: data.len(),
            required: MIN_FILE_SIZE,
        });
    }

    let has_leading = data[..4] == MAGIC;
    let has_trailing = data[data.len() - 4..] == MAGIC;

    if has_trailing {
        match read_trailing(data) {
            Ok(header) => return Ok(header),
            Err(e) if has_leading => report(
                diagnostics,
                PakDiagnostic::HeaderVariantRejected {
                    variant: HeaderVariant::Trailing,
                    reason: e.to_string(),
                },
            ),
            Err(e) => return Err(e),
        }
    }

    if has_leading {
        return read_leading(data);
    }

    Err(FormatError::UnrecognizedArchive)
}

fn truncated(e: &io::Error) -> FormatError {
    FormatError::InvalidHeader(format!("header truncated: {e}"))
}

/// Parse the v13+ header that precedes the size and signature at the end of the file.
fn read_trailing(data: &[u8]) -> Result<PackageHeader, FormatError> {
    let len = data.len();
    let mut tail = Cursor::new(&data[len - 8..]);
    let header_size = tail.read_u32::<LittleEndian>().map_err(|e| truncated(&e))? as usize;
    let signature = tail.read_u32::<LittleEndian>().map_err(|e| truncated(&e))?;

    let start = len.checked_sub(header_size).ok_or_else(|| {
        FormatError::InvalidHeader(format!(
            "header size {header_size} exceeds file size {len}"
        ))
    })?;
    let end = len - 8;
    if start > end || end - start < TRAILING_HEADER_MIN_BODY {
        return Err(FormatError::InvalidHeader(format!(
            "header body too small: {} bytes (need {TRAILING_HEADER_MIN_BODY})",
            end.saturating_sub(start)
        )));
    }

    let mut body = Cursor::new(&data[start..end]);
    let version = body.read_u32::<LittleEndian>().map_err(|e| truncated(&e))?;
    let directory_offset = body.read_u64::<LittleEndian>().map_err(|e| truncated(&e))?;
    let directory_compressed_size = body.read_u32::<LittleEndian>().map_err(|e| truncated(&e))?;
    skip(&mut body, 4)?;
    let entry_count = body.read_u32::<LittleEndian>().map_err(|e| truncated(&e))?;

    Ok(PackageHeader {
        signature,
        version,
        directory_offset,
        directory_compressed_size,
        entry_count,
        data_base_offset: 0,
        variant: HeaderVariant::Trailing,
    })
}

/// Parse the legacy v10 header at the start of the file.
fn read_leading(data: &[u8]) -> Result<PackageHeader, FormatError> {
    if data.len() < LEADING_HEADER_SIZE {
        return Err(FormatError::TooSmall {
            len: data.len(),
            required: LEADING_HEADER_SIZE,
        });
    }

    let mut cursor = Cursor::new(&data[..LEADING_HEADER_SIZE]);
    let signature = cursor.read_u32::<LittleEndian>().map_err(|e| truncated(&e))?;
    debug_assert_eq!(signature, SIGNATURE);
    let version = cursor.read_u32::<LittleEndian>().map_err(|e| truncated(&e))?;
    let directory_offset = cursor.read_u64::<LittleEndian>().map_err(|e| truncated(&e))?;
    let directory_compressed_size = cursor.read_u32::<LittleEndian>().map_err(|e| truncated(&e))?;
    skip(&mut cursor, 8)?;
    let entry_count = cursor.read_u32::<LittleEndian>().map_err(|e| truncated(&e))?;

    Ok(PackageHeader {
        signature,
        version,
        directory_offset,
        directory_compressed_size,
        entry_count,
        data_base_offset: LEGACY_DATA_OFFSET,
        variant: HeaderVariant::Leading,
    })
}

fn skip(cursor: &mut Cursor<&[u8]>, count: usize) -> Result<(), FormatError> {
    let mut reserved = [0u8; 8];
    cursor
        .read_exact(&mut reserved[..count])
        .map_err(|e| truncated(&e))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build `[padding][body][size]["LSPK"]` with a 28-byte trailing header body.
    fn trailing_archive(version: u32, directory_offset: u64, entry_count: u32) -> Vec<u8> {
        let mut data = vec![0xAAu8; 16];
        data.extend_from_slice(&version.to_le_bytes());
        data.extend_from_slice(&directory_offset.to_le_bytes());
        data.extend_from_slice(&77u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&entry_count.to_le_bytes());
        data.extend_from_slice(&[0u8; 4]);
        data.extend_from_slice(&36u32.to_le_bytes());
        data.extend_from_slice(&MAGIC);
        data
    }

    fn leading_archive(version: u32, directory_offset: u64, entry_count: u32) -> Vec<u8> {
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(&version.to_le_bytes());
        data.extend_from_slice(&directory_offset.to_le_bytes());
        data.extend_from_slice(&55u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 8]);
        data.extend_from_slice(&entry_count.to_le_bytes());
        data.extend_from_slice(&[0u8; 16]);
        data
    }

    #[test]
    fn test_trailing_header() {
        let header = read_header(&trailing_archive(18, 4096, 3)).unwrap();
        assert_eq!(header.variant, HeaderVariant::Trailing);
        assert_eq!(header.signature, SIGNATURE);
        assert_eq!(header.version, 18);
        assert_eq!(header.directory_offset, 4096);
        assert_eq!(header.directory_compressed_size, 77);
        assert_eq!(header.entry_count, 3);
        assert_eq!(header.data_base_offset, 0);
    }

    #[test]
    fn test_leading_header() {
        let header = read_header(&leading_archive(10, 512, 7)).unwrap();
        assert_eq!(header.variant, HeaderVariant::Leading);
        assert_eq!(header.version, 10);
        assert_eq!(header.directory_offset, 512);
        assert_eq!(header.directory_compressed_size, 55);
        assert_eq!(header.entry_count, 7);
        assert_eq!(header.data_base_offset, LEGACY_DATA_OFFSET);
    }

    #[test]
    fn test_no_signature() {
        let data = vec![0u8; 64];
        assert_eq!(read_header(&data), Err(FormatError::UnrecognizedArchive));
    }

    #[test]
    fn test_too_small() {
        assert_eq!(
            read_header(b"LSPK"),
            Err(FormatError::TooSmall {
                len: 4,
                required: MIN_FILE_SIZE
            })
        );
    }

    #[test]
    fn test_leading_needs_full_header() {
        let mut data = MAGIC.to_vec();
        data.extend_from_slice(&[0u8; 16]);
        assert_eq!(
            read_header(&data),
            Err(FormatError::TooSmall {
                len: 20,
                required: LEADING_HEADER_SIZE
            })
        );
    }

    #[test]
    fn test_header_size_past_start_of_file() {
        let mut data = vec![0u8; 12];
        data.extend_from_slice(&1000u32.to_le_bytes());
        data.extend_from_slice(&MAGIC);
        assert!(matches!(read_header(&data), Err(FormatError::InvalidHeader(_))));
    }

    #[test]
    fn test_header_body_too_short() {
        let mut data = vec![0u8; 40];
        data.extend_from_slice(&20u32.to_le_bytes());
        data.extend_from_slice(&MAGIC);
        assert!(matches!(read_header(&data), Err(FormatError::InvalidHeader(_))));
    }

    #[test]
    fn test_broken_trailing_falls_back_to_leading() {
        let mut data = leading_archive(10, 64, 2);
        data.extend_from_slice(&u32::MAX.to_le_bytes());
        data.extend_from_slice(&MAGIC);

        let seen = std::sync::Mutex::new(Vec::new());
        let sink = |e: &PakDiagnostic| seen.lock().unwrap().push(e.clone());
        let header = read_header_with_diagnostics(&data, &sink).unwrap();

        assert_eq!(header.variant, HeaderVariant::Leading);
        assert_eq!(header.entry_count, 2);
        assert!(matches!(
            seen.into_inner().unwrap().as_slice(),
            [PakDiagnostic::HeaderVariantRejected {
                variant: HeaderVariant::Trailing,
                ..
            }]
        ));
    }

    #[test]
    fn test_trailing_preferred_when_both_present() {
        let mut data = trailing_archive(16, 128, 9);
        data[..4].copy_from_slice(&MAGIC);
        let header = read_header(&data).unwrap();
        assert_eq!(header.variant, HeaderVariant::Trailing);
        assert_eq!(header.version, 16);
    }
}
