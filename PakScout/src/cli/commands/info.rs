//! CLI command for showing PAK header details

use std::path::Path;
use std::sync::{Arc, Mutex};

use console::style;

use crate::diagnostics::PakDiagnostic;
use crate::pak::{ArchiveReader, DEFAULT_META_FILE};

pub fn execute(source: &Path, show_diagnostics: bool) -> anyhow::Result<()> {
    let events: Arc<Mutex<Vec<PakDiagnostic>>> = Arc::default();
    let sink = Arc::clone(&events);
    let archive = ArchiveReader::open_with_diagnostics(source, move |event: &PakDiagnostic| {
        if let Ok(mut events) = sink.lock() {
            events.push(event.clone());
        }
    })?;

    let header = archive.header();
    println!("{}", style(source.display()).bold());
    println!("  Version:          {}", header.version);
    println!("  Header:           {}", header.variant.as_str());
    println!("  File size:        {} bytes", archive.file_size());
    println!("  Table offset:     {}", header.directory_offset);
    println!("  Data base offset: {}", header.member_base_offset());
    println!(
        "  Entries:          {} decoded / {} declared",
        archive.entries().len(),
        header.entry_count
    );

    match archive.find_member_by_file_name(DEFAULT_META_FILE) {
        Some(entry) => println!("  Metadata:         {}", entry.name),
        None => println!("  Metadata:         {}", style("none").dim()),
    }

    let events = events.lock().map(|e| e.clone()).unwrap_or_default();
    if show_diagnostics {
        println!();
        println!("Diagnostics ({}):", events.len());
        for event in &events {
            println!("  [{:>5}] {event}", event.level());
        }
    } else if !events.is_empty() {
        println!(
            "  Diagnostics:      {} (use --diagnostics to show)",
            events.len()
        );
    }

    Ok(())
}
