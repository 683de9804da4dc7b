//! Samples that are already in memory
//!
//! Used when the audio arrives from somewhere other than a file (a device
//! transfer, a clipboard paste) and by tests that need a source which
//! pauses at a known frame or fails partway through.

use std::path::Path;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::convert::FrameConverter;
use super::{AudioFileError, AudioFileResult, DecodeProvider, ReadStatus, SampleSource};
use crate::sample::CancelToken;
use crate::types::{LoadTarget, SampleInfo};

const DEFAULT_BLOCK_FRAMES: usize = 4096;

/// How often a gated source re-checks cancellation while waiting
const GATE_POLL: Duration = Duration::from_millis(5);

/// Serves interleaved 16-bit samples held in memory.
///
/// Optional behaviour:
/// - a gate: each block waits for one `()` on the channel (dropping the
///   sender lifts the gate)
/// - a failure after a number of blocks, reported as a decode error
pub struct MemoryDecodeProvider {
    samples: Arc<Vec<i16>>,
    channels: u16,
    samplerate: u32,
    bitdepth: u16,
    block_frames: usize,
    gate: Mutex<Option<Receiver<()>>>,
    fail_after: Option<usize>,
}

impl MemoryDecodeProvider {
    pub fn new(samples: Vec<i16>, channels: u16, samplerate: u32) -> Self {
        Self {
            samples: Arc::new(samples),
            channels: channels.max(1),
            samplerate,
            bitdepth: 16,
            block_frames: DEFAULT_BLOCK_FRAMES,
            gate: Mutex::new(None),
            fail_after: None,
        }
    }

    pub fn with_block_frames(mut self, frames: usize) -> Self {
        self.block_frames = frames.max(1);
        self
    }

    /// Gate every block on a permit from `gate`. The next opened source takes the gate.
    pub fn with_gate(self, gate: Receiver<()>) -> Self {
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = Some(gate);
        self
    }

    /// Fail with a decode error after `blocks` successful blocks.
    pub fn fail_after(mut self, blocks: usize) -> Self {
        self.fail_after = Some(blocks);
        self
    }
}

impl DecodeProvider for MemoryDecodeProvider {
    fn open(&self, path: &Path, target: &LoadTarget) -> AudioFileResult<Box<dyn SampleSource>> {
        log::debug!("MemoryDecodeProvider::open: {:?}", path);
        let gate = self.gate.lock().unwrap_or_else(PoisonError::into_inner).take();
        Ok(Box::new(MemorySource {
            samples: Arc::clone(&self.samples),
            channels: self.channels,
            samplerate: self.samplerate,
            bitdepth: self.bitdepth,
            block_frames: self.block_frames,
            position: 0,
            blocks_read: 0,
            gate,
            fail_after: self.fail_after,
            converter: FrameConverter::new(self.channels, self.samplerate, target),
            target_rate: if target.samplerate == 0 { self.samplerate } else { target.samplerate },
            scratch: Vec::new(),
            flushed: false,
        }))
    }
}

/// Source over an in-memory buffer.
pub struct MemorySource {
    samples: Arc<Vec<i16>>,
    channels: u16,
    samplerate: u32,
    bitdepth: u16,
    block_frames: usize,
    position: usize,
    blocks_read: usize,
    gate: Option<Receiver<()>>,
    fail_after: Option<usize>,
    converter: FrameConverter,
    target_rate: u32,
    scratch: Vec<f32>,
    flushed: bool,
}

impl MemorySource {
    fn total_frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Wait for a permit. Returns false when cancelled while waiting.
    fn wait_for_gate(&mut self, cancel: &CancelToken) -> bool {
        let Some(gate) = &self.gate else {
            return true;
        };
        loop {
            match gate.recv_timeout(GATE_POLL) {
                Ok(()) => return true,
                Err(RecvTimeoutError::Timeout) => {
                    if cancel.is_cancelled() {
                        return false;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.gate = None;
                    return true;
                }
            }
        }
    }
}

impl SampleSource for MemorySource {
    fn info(&self) -> SampleInfo {
        SampleInfo {
            channels: self.channels,
            samplerate: self.target_rate,
            source_samplerate: self.samplerate,
            bitdepth: self.bitdepth,
            frames: super::map_frame_between_rates(
                self.total_frames() as u64,
                self.samplerate,
                self.target_rate,
            ) as usize,
            loop_start: None,
            loop_end: None,
        }
    }

    fn channels(&self) -> u16 {
        self.converter.out_channels()
    }

    fn progress(&self) -> f64 {
        let total = self.total_frames();
        if total == 0 {
            return 1.0;
        }
        self.position as f64 / total as f64
    }

    fn read_block(&mut self, out: &mut Vec<i16>, cancel: &CancelToken) -> AudioFileResult<ReadStatus> {
        let total = self.total_frames();
        if self.position >= total {
            if self.flushed {
                return Ok(ReadStatus::Finished);
            }
            self.flushed = true;
            return Ok(ReadStatus::Data(self.converter.finish(out)));
        }

        if self.fail_after == Some(self.blocks_read) {
            return Err(AudioFileError::Decode(format!(
                "stream broke after {} frames",
                self.position
            )));
        }
        if !self.wait_for_gate(cancel) {
            return Ok(ReadStatus::Finished);
        }

        let ch = self.channels as usize;
        let end = (self.position + self.block_frames).min(total);
        self.scratch.clear();
        self.scratch.extend(
            self.samples[self.position * ch..end * ch]
                .iter()
                .map(|&s| s as f32 / 32768.0),
        );
        self.position = end;
        self.blocks_read += 1;
        Ok(ReadStatus::Data(self.converter.push(&self.scratch, out)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_serves_blocks_in_order() {
        let provider = MemoryDecodeProvider::new((0..10).collect(), 1, 48000).with_block_frames(4);
        let mut source = provider
            .open(Path::new("memory"), &LoadTarget::new(1, 48000))
            .unwrap();
        let cancel = CancelToken::new();
        let mut out = Vec::new();
        assert_eq!(source.read_block(&mut out, &cancel).unwrap(), ReadStatus::Data(4));
        assert_eq!(source.read_block(&mut out, &cancel).unwrap(), ReadStatus::Data(4));
        assert_eq!(source.read_block(&mut out, &cancel).unwrap(), ReadStatus::Data(2));
        assert_eq!(source.read_block(&mut out, &cancel).unwrap(), ReadStatus::Data(0));
        assert_eq!(source.read_block(&mut out, &cancel).unwrap(), ReadStatus::Finished);
        assert_eq!(out, (0..10).collect::<Vec<i16>>());
    }

    #[test]
    fn test_gated_source_returns_when_cancelled() {
        let (_permits, gate) = mpsc::channel();
        let provider = MemoryDecodeProvider::new(vec![0; 100], 1, 48000).with_gate(gate);
        let mut source = provider
            .open(Path::new("memory"), &LoadTarget::new(1, 48000))
            .unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let mut out = Vec::new();
        assert_eq!(source.read_block(&mut out, &cancel).unwrap(), ReadStatus::Finished);
        assert!(out.is_empty());
    }

    #[test]
    fn test_fails_after_requested_blocks() {
        let provider = MemoryDecodeProvider::new(vec![0; 100], 1, 48000)
            .with_block_frames(10)
            .fail_after(2);
        let mut source = provider
            .open(Path::new("memory"), &LoadTarget::new(1, 48000))
            .unwrap();
        let cancel = CancelToken::new();
        let mut out = Vec::new();
        source.read_block(&mut out, &cancel).unwrap();
        source.read_block(&mut out, &cancel).unwrap();
        assert!(matches!(
            source.read_block(&mut out, &cancel),
            Err(AudioFileError::Decode(_))
        ));
        assert_eq!(out.len(), 20);
    }
}
