//! CLI command for listing PAK contents

use std::path::Path;

use crate::pak::{ArchiveReader, DirectoryEntry};

/// Simple glob pattern matching (supports * and ?), ignoring ASCII case
pub(crate) fn matches_glob(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();
    matches_glob_recursive(&pattern_chars, &text_chars, 0, 0)
}

fn matches_glob_recursive(pattern: &[char], text: &[char], pi: usize, ti: usize) -> bool {
    if pi == pattern.len() {
        return ti == text.len();
    }

    match pattern[pi] {
        '*' => (ti..=text.len()).any(|i| matches_glob_recursive(pattern, text, pi + 1, i)),
        '?' => ti < text.len() && matches_glob_recursive(pattern, text, pi + 1, ti + 1),
        c => {
            ti < text.len()
                && text[ti].eq_ignore_ascii_case(&c)
                && matches_glob_recursive(pattern, text, pi + 1, ti + 1)
        }
    }
}

/// Match against the file name or the full member path
fn matches_member(pattern: &str, member: &str) -> bool {
    let file_name = member.rsplit(['/', '\\']).next().unwrap_or(member);
    matches_glob(pattern, file_name) || matches_glob(pattern, member)
}

/// Format byte size for human-readable output
pub(crate) fn format_size(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1}M", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}K", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}")
    }
}

pub fn execute(
    source: &Path,
    detailed: bool,
    filter: Option<&str>,
    count: bool,
) -> anyhow::Result<()> {
    let archive = ArchiveReader::open(source)?;

    let filtered: Vec<&DirectoryEntry> = archive
        .entries()
        .iter()
        .filter(|e| filter.is_none_or(|pattern| matches_member(pattern, &e.name)))
        .collect();

    if count {
        println!("{}", filtered.len());
        return Ok(());
    }

    if !detailed {
        for entry in filtered {
            println!("{}", entry.name);
        }
        return Ok(());
    }

    println!(
        "{:>10}  {:>10}  {:>6}  {:>10}  PATH",
        "SIZE", "ON DISK", "RATIO", "OFFSET"
    );

    for entry in &filtered {
        let ratio = if entry.uncompressed_size > 0 {
            (entry.size_on_disk as f64 / entry.uncompressed_size as f64) * 100.0
        } else {
            100.0
        };

        println!(
            "{:>10}  {:>10}  {:>5.1}%  {:>10}  {}",
            format_size(entry.uncompressed_size),
            format_size(entry.size_on_disk),
            ratio,
            entry.offset,
            entry.name
        );
    }

    let total_uncompressed: u64 = filtered.iter().map(|e| e.uncompressed_size).sum();
    let total_on_disk: u64 = filtered.iter().map(|e| e.size_on_disk).sum();
    let overall_ratio = if total_uncompressed > 0 {
        (total_on_disk as f64 / total_uncompressed as f64) * 100.0
    } else {
        100.0
    };

    println!();
    println!(
        "{} files, {} total ({} on disk, {:.1}% ratio)",
        filtered.len(),
        format_size(total_uncompressed),
        format_size(total_on_disk),
        overall_ratio
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob() {
        assert!(matches_glob("*.lsx", "meta.lsx"));
        assert!(matches_glob("*.LSX", "meta.lsx"));
        assert!(matches_glob("meta.?sx", "meta.lsx"));
        assert!(!matches_glob("*.lsf", "meta.lsx"));
        assert!(!matches_glob("meta", "meta.lsx"));
    }

    #[test]
    fn test_member_filter_uses_file_name_or_path() {
        assert!(matches_member("meta.lsx", "Mods/Foo/meta.lsx"));
        assert!(matches_member("Mods/*/meta.lsx", "Mods/Foo/meta.lsx"));
        assert!(!matches_member("Public/*", "Mods/Foo/meta.lsx"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512");
        assert_eq!(format_size(2048), "2.0K");
        assert_eq!(format_size(3 * 1_048_576), "3.0M");
    }
}
