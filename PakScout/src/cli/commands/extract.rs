//! CLI command for extracting a single PAK member

use std::io::Write;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use crate::cli::progress::{DISK, LOOKING_GLASS, PACKAGE, print_done, print_step};
use crate::pak::ArchiveReader;

pub fn execute(
    source: &Path,
    member: &str,
    output: Option<&Path>,
    case_insensitive: bool,
    raw: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();
    let steps = if output.is_some() { 3 } else { 2 };

    print_step(1, steps, LOOKING_GLASS, "Reading PAK file table...");
    let archive = ArchiveReader::open(source)
        .with_context(|| format!("Failed to open {}", source.display()))?;

    let entry = (if case_insensitive {
        archive.find_entry(member)
    } else {
        archive.find_entry_exact(member)
    })
    .with_context(|| format!("'{member}' not found in {}", source.display()))?;

    print_step(2, steps, PACKAGE, &format!("Extracting {}...", entry.name));
    let data = if raw {
        archive.stored_bytes(entry)?.to_vec()
    } else {
        let extracted = archive.extract_entry(entry)?;
        if extracted.short_read {
            tracing::warn!(
                "{} is truncated: {} of {} bytes read",
                entry.name,
                extracted.data.len(),
                entry.size_on_disk
            );
        }
        extracted.data
    };

    match output {
        Some(path) => {
            print_step(3, steps, DISK, &format!("Writing {}...", path.display()));
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &data)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_done(started.elapsed());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&data)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
