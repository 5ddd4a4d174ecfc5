//! LZ4 decompression with layered fallbacks
//!
//! PAK file tables and members are LZ4 compressed, but archives in the wild
//! disagree about the framing. [`decompress`] tries each known framing in a
//! fixed order and returns the first success:
//!
//! 1. LZ4 frame (self-describing, ignores the size hint)
//! 2. LZ4 block using the caller's expected size
//! 3. LZ4 block with a little-endian `u32` size prefix
//! 4. Input that is already valid UTF-8 text is returned unchanged

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};

use crate::diagnostics::{DiagnosticCallback, PakDiagnostic, ignore_diagnostics, report};
use crate::error::{Error, Result};

/// Magic bytes at the start of an LZ4 frame (`0x184D2204` little-endian)
pub const LZ4_FRAME_MAGIC: [u8; 4] = [0x04, 0x22, 0x4D, 0x18];

/// Upper bound on LZ4 output per input byte.
///
/// Size hints are clamped to this so a corrupt header cannot request a huge allocation.
const MAX_LZ4_EXPANSION: usize = 255;

/// Slack added on top of [`MAX_LZ4_EXPANSION`] for tiny inputs.
const EXPANSION_SLACK: usize = 64;

/// One framing hypothesis tried by [`decompress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecompressionStrategy {
    /// LZ4 frame format
    Frame,
    /// Raw LZ4 block decoded with the caller's size hint
    BlockWithSize,
    /// Raw LZ4 block preceded by its decompressed size
    BlockSizePrepended,
    /// Input was already plain text
    AlreadyDecompressed,
}

impl DecompressionStrategy {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Frame => "frame",
            Self::BlockWithSize => "block_with_size",
            Self::BlockSizePrepended => "block_auto",
            Self::AlreadyDecompressed => "already_decompressed",
        }
    }
}

type StrategyFn = fn(&[u8], Option<usize>) -> std::result::Result<Vec<u8>, String>;

/// Strategies in the order they are attempted.
const STRATEGIES: [(DecompressionStrategy, StrategyFn); 4] = [
    (DecompressionStrategy::Frame, decompress_frame),
    (DecompressionStrategy::BlockWithSize, decompress_block_with_size),
    (DecompressionStrategy::BlockSizePrepended, decompress_block_size_prepended),
    (DecompressionStrategy::AlreadyDecompressed, passthrough_text),
];

/// Decompress `data`, trying every known framing in turn.
///
/// `expected_size` is only consulted by the sized block strategy; `None` or
/// `Some(0)` skips it.
///
/// # Errors
/// Returns [`Error::DecompressionExhausted`] if no strategy succeeds and the
/// input is not valid UTF-8.
pub fn decompress(data: &[u8], expected_size: Option<usize>) -> Result<Vec<u8>> {
    decompress_with_diagnostics(data, expected_size, &ignore_diagnostics)
}

/// Same as [`decompress`], reporting each attempt to `diagnostics`.
///
/// # Errors
/// Returns [`Error::DecompressionExhausted`] if no strategy succeeds.
pub fn decompress_with_diagnostics(
    data: &[u8],
    expected_size: Option<usize>,
    diagnostics: DiagnosticCallback,
) -> Result<Vec<u8>> {
    for (strategy, attempt) in STRATEGIES {
        match attempt(data, expected_size) {
            Ok(output) => {
                report(
                    diagnostics,
                    PakDiagnostic::Decompressed {
                        strategy,
                        input_len: data.len(),
                        output_len: output.len(),
                    },
                );
                return Ok(output);
            }
            Err(reason) => report(diagnostics, PakDiagnostic::StrategyFailed { strategy, reason }),
        }
    }

    Err(Error::DecompressionExhausted {
        input_len: data.len(),
        expected: expected_size,
    })
}

/// Largest output an LZ4 stream of `input_len` bytes can plausibly produce.
fn max_output_len(input_len: usize) -> usize {
    input_len
        .saturating_mul(MAX_LZ4_EXPANSION)
        .saturating_add(EXPANSION_SLACK)
}

fn decompress_frame(data: &[u8], _expected: Option<usize>) -> std::result::Result<Vec<u8>, String> {
    let mut decoder = lz4_flex::frame::FrameDecoder::new(data);
    let mut output = Vec::new();
    decoder.read_to_end(&mut output).map_err(|e| e.to_string())?;
    Ok(output)
}

fn decompress_block_with_size(
    data: &[u8],
    expected: Option<usize>,
) -> std::result::Result<Vec<u8>, String> {
    let expected = match expected {
        Some(size) if size > 0 => size,
        _ => return Err("no size hint".to_string()),
    };

    // Block decoding only needs an upper bound; the result is truncated to the real length
    let capacity = expected.min(max_output_len(data.len()));
    lz4_flex::block::decompress(data, capacity).map_err(|e| e.to_string())
}

fn decompress_block_size_prepended(
    data: &[u8],
    _expected: Option<usize>,
) -> std::result::Result<Vec<u8>, String> {
    if data.len() < 4 {
        return Err("input shorter than size prefix".to_string());
    }

    let declared = LittleEndian::read_u32(&data[..4]) as usize;
    if declared > max_output_len(data.len() - 4) {
        return Err(format!("declared size {declared} is implausible"));
    }

    lz4_flex::block::decompress_size_prepended(data).map_err(|e| e.to_string())
}

fn passthrough_text(data: &[u8], _expected: Option<usize>) -> std::result::Result<Vec<u8>, String> {
    std::str::from_utf8(data)
        .map(|_| data.to_vec())
        .map_err(|e| format!("not text: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    const SAMPLE: &[u8] =
        b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><save><region id=\"Config\"/></save>";

    fn frame_compress(data: &[u8]) -> Vec<u8> {
        let mut encoder = lz4_flex::frame::FrameEncoder::new(Vec::new());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn strategies_used(
        data: &[u8],
        expected: Option<usize>,
    ) -> (Result<Vec<u8>>, Vec<PakDiagnostic>) {
        let seen = Mutex::new(Vec::new());
        let sink = |e: &PakDiagnostic| seen.lock().unwrap().push(e.clone());
        let result = decompress_with_diagnostics(data, expected, &sink);
        (result, seen.into_inner().unwrap())
    }

    #[test]
    fn test_frame_is_tried_first() {
        let compressed = frame_compress(SAMPLE);
        assert!(compressed.starts_with(&LZ4_FRAME_MAGIC));

        let (result, events) = strategies_used(&compressed, Some(3));
        assert_eq!(result.unwrap(), SAMPLE);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            PakDiagnostic::Decompressed {
                strategy: DecompressionStrategy::Frame,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_frame_decodes_to_nothing() {
        let compressed = frame_compress(b"");
        assert!(compressed.starts_with(&LZ4_FRAME_MAGIC));

        let (result, events) = strategies_used(&compressed, Some(0));
        assert_eq!(result.unwrap(), Vec::<u8>::new());
        assert!(matches!(
            events.as_slice(),
            [PakDiagnostic::Decompressed {
                strategy: DecompressionStrategy::Frame,
                ..
            }]
        ));
    }

    #[test]
    fn test_block_with_exact_size() {
        let compressed = lz4_flex::block::compress(SAMPLE);
        let output = decompress(&compressed, Some(SAMPLE.len())).unwrap();
        assert_eq!(output, SAMPLE);
    }

    #[test]
    fn test_block_with_oversized_hint_is_truncated() {
        let compressed = lz4_flex::block::compress(SAMPLE);
        let output = decompress(&compressed, Some(SAMPLE.len() * 4)).unwrap();
        assert_eq!(output, SAMPLE);
    }

    #[test]
    fn test_absurd_size_hint_is_clamped() {
        let compressed = lz4_flex::block::compress(SAMPLE);
        let output = decompress(&compressed, Some(usize::MAX)).unwrap();
        assert_eq!(output, SAMPLE);
    }

    #[test]
    fn test_size_prepended_without_hint() {
        let compressed = lz4_flex::block::compress_prepend_size(SAMPLE);
        let (result, events) = strategies_used(&compressed, None);
        assert_eq!(result.unwrap(), SAMPLE);
        assert!(events.iter().any(|e| matches!(
            e,
            PakDiagnostic::Decompressed {
                strategy: DecompressionStrategy::BlockSizePrepended,
                ..
            }
        )));
    }

    #[test]
    fn test_zero_hint_skips_sized_block() {
        let (_, events) = strategies_used(b"plain", Some(0));
        assert!(events.iter().any(|e| matches!(
            e,
            PakDiagnostic::StrategyFailed {
                strategy: DecompressionStrategy::BlockWithSize,
                reason,
            } if reason == "no size hint"
        )));
    }

    #[test]
    fn test_plain_text_passes_through() {
        let text = b"just some text";
        let (result, events) = strategies_used(text, None);
        assert_eq!(result.unwrap(), text);
        assert!(matches!(
            events.last(),
            Some(PakDiagnostic::Decompressed {
                strategy: DecompressionStrategy::AlreadyDecompressed,
                ..
            })
        ));
    }

    #[test]
    fn test_binary_garbage_is_exhausted() {
        let garbage = [0xFFu8; 16];
        let err = decompress(&garbage, Some(64)).unwrap_err();
        assert!(matches!(
            err,
            Error::DecompressionExhausted {
                input_len: 16,
                expected: Some(64)
            }
        ));
    }
}
