//! Sample decoding
//!
//! A [`DecodeProvider`] opens a source synchronously (so an unreadable file
//! is reported once, to the caller) and hands back a [`SampleSource`] that
//! the loader thread drains block by block. Every source converts to the
//! [`LoadTarget`] on the fly: channels are reduced to the effective channel
//! count and the rate is converted by a streaming linear interpolator, so
//! what comes out of `read_block` can be appended to the shared buffer as is.
//!
//! Providers:
//! - [`WavDecodeProvider`]: RIFF/WAVE PCM 8/16/24/32-bit and 32-bit float, `smpl` loop points
//! - [`CompressedDecodeProvider`]: anything symphonia's default registry probes
//! - [`AutoDecodeProvider`]: picks one of the above by file extension
//! - [`MemoryDecodeProvider`]: interleaved samples already in memory

mod compressed;
mod convert;
mod memory;
mod wav;

pub use compressed::{CompressedDecodeProvider, CompressedSource};
pub use convert::{map_frame_between_rates, FrameConverter};
pub use memory::{MemoryDecodeProvider, MemorySource};
pub use wav::{WavDecodeProvider, WavFormat, WavSource};

use std::path::Path;

use thiserror::Error;

use crate::sample::CancelToken;
use crate::types::{LoadTarget, SampleInfo};

/// Errors produced while opening or decoding a sample
#[derive(Error, Debug)]
pub enum AudioFileError {
    /// File not found or couldn't be read
    #[error("IO error: {0}")]
    Io(String),

    /// Not a file this provider understands
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Missing required chunk
    #[error("Missing required chunk: {0}")]
    MissingChunk(&'static str),

    /// Unsupported bit depth
    #[error("Unsupported bit depth: {0}")]
    UnsupportedBitDepth(u16),

    /// Codec or container the decoder can't handle
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// File is corrupted or truncated
    #[error("File corrupted: {0}")]
    Corrupted(String),

    /// Decoder failure in the middle of a stream
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<std::io::Error> for AudioFileError {
    fn from(e: std::io::Error) -> Self {
        AudioFileError::Io(e.to_string())
    }
}

/// Result type for decode operations
pub type AudioFileResult<T> = Result<T, AudioFileError>;

/// Outcome of one block read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// Frames appended to the output (may be 0 while a resampler buffers)
    Data(usize),
    /// End of stream; nothing more will be appended
    Finished,
}

/// A progressive decoder positioned at the start of the audio data.
pub trait SampleSource: Send {
    /// Metadata of the sample as it will be loaded. `frames` is the
    /// estimated final frame count (0 when unknown).
    fn info(&self) -> SampleInfo;

    /// Channel count of the converted output (1 or 2)
    fn channels(&self) -> u16;

    /// Fraction of the source consumed so far, in [0, 1]
    fn progress(&self) -> f64;

    /// Decode the next block, appending interleaved 16-bit frames to `out`.
    ///
    /// Sources that may block inside a read must return
    /// `ReadStatus::Finished` promptly once `cancel` is set.
    fn read_block(&mut self, out: &mut Vec<i16>, cancel: &CancelToken) -> AudioFileResult<ReadStatus>;
}

/// Opens sample sources.
pub trait DecodeProvider: Send + Sync {
    fn open(&self, path: &Path, target: &LoadTarget) -> AudioFileResult<Box<dyn SampleSource>>;
}

/// Chooses the WAV reader for `.wav`/`.wave` files and symphonia otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoDecodeProvider {
    wav: WavDecodeProvider,
    compressed: CompressedDecodeProvider,
}

impl AutoDecodeProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DecodeProvider for AutoDecodeProvider {
    fn open(&self, path: &Path, target: &LoadTarget) -> AudioFileResult<Box<dyn SampleSource>> {
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("wav") || ext.eq_ignore_ascii_case("wave"))
            .unwrap_or(false);

        if is_wav {
            match self.wav.open(path, target) {
                Ok(source) => return Ok(source),
                // WAVE_FORMAT_EXTENSIBLE variants and other oddities symphonia may still read
                Err(AudioFileError::UnsupportedFormat(msg)) => {
                    log::debug!("WAV reader declined {:?} ({}), trying symphonia", path, msg);
                }
                Err(e) => return Err(e),
            }
        }
        self.compressed.open(path, target)
    }
}
