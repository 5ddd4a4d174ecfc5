//! CLI command for scanning a folder of PAK files

use std::path::Path;
use std::time::Instant;

use console::style;

use crate::cli::progress::{LOOKING_GLASS, hidden_bar, print_done, print_step, simple_bar};
use crate::pak::{BatchScanResult, PakPhase, ScanOptions, scan_directory};

pub fn execute(
    dir: &Path,
    options: &ScanOptions,
    json: bool,
    output: Option<&Path>,
    quiet: bool,
) -> anyhow::Result<()> {
    let started = Instant::now();

    if !quiet {
        print_step(
            1,
            1,
            LOOKING_GLASS,
            &format!(
                "Scanning {} on {} workers...",
                dir.display(),
                options.worker_count()
            ),
        );
    }

    let pb = if quiet {
        hidden_bar()
    } else {
        simple_bar(0, "Scanning")
    };

    let result = scan_directory(dir, options, &|progress| {
        pb.set_length(progress.total as u64);
        pb.set_position(progress.current as u64);
        match &progress.current_file {
            Some(file) if progress.phase != PakPhase::Complete => {
                pb.set_message(format!("{}: {file}", progress.phase.as_str()));
            }
            _ => pb.set_message(progress.phase.as_str()),
        }
    })?;
    pb.finish_and_clear();

    let report = if json {
        result.to_json()?
    } else {
        render_table(dir, &result)
    };

    match output {
        Some(path) => std::fs::write(path, report)?,
        None => println!("{report}"),
    }

    if !quiet {
        print_done(started.elapsed());
    }

    Ok(())
}

fn render_table(dir: &Path, result: &BatchScanResult) -> String {
    let mut lines = vec![format!(
        "{:>4}  {:>9}  {:>7}  {:<40}  META",
        "VER", "HEADER", "MEMBERS", "PAK"
    )];

    for scan in &result.archives {
        let display = scan
            .path
            .strip_prefix(dir)
            .unwrap_or(scan.path.as_path())
            .display()
            .to_string();
        match (&scan.summary, &scan.error) {
            (Some(summary), _) => lines.push(format!(
                "{:>4}  {:>9}  {:>7}  {:<40}  {}",
                summary.version,
                summary.variant.as_str(),
                summary.member_count,
                display,
                summary.meta_path.as_deref().unwrap_or("-")
            )),
            (None, error) => lines.push(format!(
                "{:>4}  {:>9}  {:>7}  {:<40}  {}",
                "-",
                "-",
                "-",
                display,
                style(error.as_deref().unwrap_or("failed")).red()
            )),
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "{} scanned, {} failed",
        result.success_count, result.fail_count
    ));
    lines.join("\n")
}
