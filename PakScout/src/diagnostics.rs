//! Diagnostic events raised while reading PAK archives
//!
//! Every component accepts a [`DiagnosticCallback`] and reports what it had to
//! work around: failed decompression strategies, dropped table records, short
//! reads. Events are also emitted through `tracing` at their own level, so the
//! library stays silent unless the host installs a subscriber or passes a
//! callback.

use std::fmt;

use crate::compression::DecompressionStrategy;
use crate::pak::lspk::HeaderVariant;

/// Diagnostic callback for PAK operations.
///
/// Must be `Sync + Send` so the same sink can be shared by a parallel batch scan.
pub type DiagnosticCallback<'a> = &'a (dyn Fn(&PakDiagnostic) + Sync + Send);

/// Callback that discards every event.
pub fn ignore_diagnostics(_: &PakDiagnostic) {}

/// Why a file table record was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The path field was empty.
    EmptyName,
    /// The stored offset was zero.
    ZeroOffset,
    /// A field of the layout does not fit inside the record.
    FieldOutOfBounds {
        /// Byte position the field starts at.
        position: usize,
        /// Record width in bytes.
        stride: usize,
    },
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => f.write_str("empty name"),
            Self::ZeroOffset => f.write_str("zero offset"),
            Self::FieldOutOfBounds { position, stride } => {
                write!(f, "field at {position} exceeds {stride}-byte record")
            }
        }
    }
}

/// A single diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PakDiagnostic {
    /// A decompression strategy did not produce output.
    StrategyFailed {
        strategy: DecompressionStrategy,
        reason: String,
    },
    /// A decompression strategy succeeded.
    Decompressed {
        strategy: DecompressionStrategy,
        input_len: usize,
        output_len: usize,
    },
    /// The trailing header was present but unusable; falling back to the leading one.
    HeaderVariantRejected {
        variant: HeaderVariant,
        reason: String,
    },
    /// The file table could not be located or decompressed.
    DirectoryUnreadable { reason: String },
    /// The record width was taken from the decompressed table length.
    StrideInferred { stride: usize },
    /// The computed width was implausible, so the version default was used.
    StrideFallback {
        calculated: usize,
        stride: usize,
        version: u32,
    },
    /// A table record was skipped.
    RecordDropped { index: usize, reason: DropReason },
    /// Fewer payload bytes were available than the entry declares.
    ShortRead {
        name: String,
        requested: u64,
        read: u64,
    },
    /// Decompression of a member failed and its raw bytes were returned.
    RawFallback { name: String, reason: String },
}

impl PakDiagnostic {
    /// Severity of this event.
    #[must_use]
    pub fn level(&self) -> tracing::Level {
        match self {
            Self::StrategyFailed { .. }
            | Self::Decompressed { .. }
            | Self::StrideInferred { .. } => tracing::Level::DEBUG,
            Self::StrideFallback { .. } | Self::RecordDropped { .. } => tracing::Level::INFO,
            Self::HeaderVariantRejected { .. }
            | Self::DirectoryUnreadable { .. }
            | Self::ShortRead { .. }
            | Self::RawFallback { .. } => tracing::Level::WARN,
        }
    }
}

impl fmt::Display for PakDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrategyFailed { strategy, reason } => {
                write!(f, "decompression strategy {} failed: {reason}", strategy.as_str())
            }
            Self::Decompressed {
                strategy,
                input_len,
                output_len,
            } => write!(
                f,
                "decompressed {input_len} -> {output_len} bytes using {}",
                strategy.as_str()
            ),
            Self::HeaderVariantRejected { variant, reason } => {
                write!(f, "{} header rejected: {reason}", variant.as_str())
            }
            Self::DirectoryUnreadable { reason } => write!(f, "file table unreadable: {reason}"),
            Self::StrideInferred { stride } => write!(f, "using inferred entry size {stride}"),
            Self::StrideFallback {
                calculated,
                stride,
                version,
            } => write!(
                f,
                "calculated entry size {calculated} out of range, using {stride} for v{version}"
            ),
            Self::RecordDropped { index, reason } => write!(f, "entry {index} dropped: {reason}"),
            Self::ShortRead {
                name,
                requested,
                read,
            } => write!(f, "short read for {name}: got {read} of {requested} bytes"),
            Self::RawFallback { name, reason } => {
                write!(f, "returning raw bytes for {name}: {reason}")
            }
        }
    }
}

/// Emit `event` through `tracing` and hand it to `sink`.
pub(crate) fn report(sink: DiagnosticCallback, event: PakDiagnostic) {
    match event.level() {
        tracing::Level::WARN => tracing::warn!("{event}"),
        tracing::Level::INFO => tracing::info!("{event}"),
        _ => tracing::debug!("{event}"),
    }
    sink(&event);
}
