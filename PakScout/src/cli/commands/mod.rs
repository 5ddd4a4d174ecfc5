use clap::Subcommand;
use std::path::PathBuf;

pub mod execute;
pub mod extract;
pub mod info;
pub mod list;
pub mod scan;

#[derive(Subcommand)]
pub enum Commands {
    /// List PAK contents
    List {
        /// PAK file
        #[arg(short, long)]
        source: PathBuf,

        /// Show detailed info (sizes, offsets, compression ratio)
        #[arg(short, long)]
        detailed: bool,

        /// Only list files matching glob pattern (e.g., "*.lsx")
        #[arg(long)]
        filter: Option<String>,

        /// Only show count of matching files
        #[arg(short, long)]
        count: bool,
    },

    /// Show the PAK header and what was recovered from the file table
    Info {
        /// PAK file
        #[arg(short, long)]
        source: PathBuf,

        /// Print every diagnostic raised while reading
        #[arg(long)]
        diagnostics: bool,
    },

    /// Extract a single member
    Extract {
        /// Source PAK file
        #[arg(short, long)]
        source: PathBuf,

        /// Member path inside the PAK (matched ignoring case)
        #[arg(short, long)]
        member: String,

        /// Output file (writes to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Match the member path exactly, including case
        #[arg(long)]
        exact: bool,

        /// Write the stored bytes without decompressing them
        #[arg(long)]
        raw: bool,
    },

    /// Scan a folder of PAK files and report version, member count and metadata
    Scan {
        /// Folder to search for .pak files
        dir: PathBuf,

        /// Maximum folder depth to search (1 = the folder only)
        #[arg(long)]
        depth: Option<usize>,

        /// Maximum number of parallel workers (defaults to all cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Metadata file to look for in each PAK
        #[arg(long, default_value = crate::pak::DEFAULT_META_FILE)]
        meta: String,

        /// Emit a JSON report instead of a table
        #[arg(long)]
        json: bool,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}
