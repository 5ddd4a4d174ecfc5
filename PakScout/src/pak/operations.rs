//! One-shot archive operations
//!
//! Each call opens the archive, answers the question and drops the buffer again.
//! Keep an [`ArchiveReader`] around instead when asking more than one question.

use std::path::Path;

use super::ArchiveReader;
use crate::error::Result;

/// List the member paths of the archive at `pak`, in table order.
///
/// # Errors
/// Returns an error if the file cannot be read or carries no LSPK header.
pub fn list_members<P: AsRef<Path>>(pak: P) -> Result<Vec<String>> {
    Ok(ArchiveReader::open(pak)?.list_members())
}

/// Extract a single member from the archive at `pak`.
///
/// Returns `Ok(None)` when the member is not in the file table.
///
/// # Errors
/// Returns an error if the file cannot be read or carries no LSPK header.
pub fn extract_member<P: AsRef<Path>>(
    pak: P,
    member: &str,
    case_insensitive: bool,
) -> Result<Option<Vec<u8>>> {
    let archive = ArchiveReader::open(pak)?;
    Ok(if case_insensitive {
        archive.extract(member)
    } else {
        archive.extract_exact(member)
    })
}
