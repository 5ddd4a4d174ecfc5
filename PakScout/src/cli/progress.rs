//! CLI progress display utilities
//!
//! Step indicators and progress bars for the scan and extract commands.

use std::time::Duration;

use console::{Emoji, style};
use indicatif::{HumanDuration, ProgressBar, ProgressStyle};

// =============================================================================
// Emoji Constants (with ASCII fallbacks for terminals without emoji support)
// =============================================================================

/// Magnifying glass - for reading/scanning operations
pub static LOOKING_GLASS: Emoji<'_, '_> = Emoji("🔍 ", "");
/// Package - for extraction operations
pub static PACKAGE: Emoji<'_, '_> = Emoji("📦 ", "");
/// Floppy disk - for writing/saving operations
pub static DISK: Emoji<'_, '_> = Emoji("💾 ", "");
/// Sparkles - for completion
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "");

// =============================================================================
// Step-Based Progress
// =============================================================================

/// Print a step indicator to stderr: `[1/3] 📦 Message...`
///
/// Goes to stderr so that member bytes written to stdout stay clean.
pub fn print_step(current: usize, total: usize, emoji: Emoji, msg: &str) {
    eprintln!(
        "{} {}{}",
        style(format!("[{current}/{total}]")).bold().dim(),
        emoji,
        msg
    );
}

/// Print completion message: `✨ Done in 2s`
pub fn print_done(elapsed: Duration) {
    eprintln!("{} Done in {}", SPARKLE, HumanDuration(elapsed));
}

// =============================================================================
// Progress Bars
// =============================================================================

/// Progress bar style for determinate progress
///
/// Format: `Scanning [████████░░░░░░░░] 50/100 file.pak`
#[must_use]
pub fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
}

/// Create a simple progress bar drawn on stderr
#[must_use]
pub fn simple_bar(total: u64, prefix: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(bar_style());
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Hidden progress bar for `--quiet` runs
#[must_use]
pub fn hidden_bar() -> ProgressBar {
    ProgressBar::hidden()
}
