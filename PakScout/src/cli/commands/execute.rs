//! Command execution implementations

use super::Commands;
use super::{extract, info, list, scan};
use crate::pak::ScanOptions;

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::List {
                source,
                detailed,
                filter,
                count,
            } => list::execute(source, *detailed, filter.as_deref(), *count),
            Commands::Info {
                source,
                diagnostics,
            } => info::execute(source, *diagnostics),
            Commands::Extract {
                source,
                member,
                output,
                exact,
                raw,
            } => extract::execute(source, member, output.as_deref(), !*exact, *raw),
            Commands::Scan {
                dir,
                depth,
                jobs,
                meta,
                json,
                output,
                quiet,
            } => {
                let mut options = ScanOptions::new().with_meta_file_name(meta.as_str());
                if let Some(depth) = depth {
                    options = options.with_max_depth(*depth);
                }
                if let Some(jobs) = jobs {
                    options = options.with_max_workers(*jobs);
                }
                scan::execute(dir, &options, *json, output.as_deref(), *quiet)
            }
        }
    }
}
