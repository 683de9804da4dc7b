//! Playback position over the loaded prefix

use crate::sample::SampleState;

/// Reads frames from a [`SampleState`] into an output buffer, converting
/// rate by nearest-frame stepping and duplicating mono to every output
/// channel.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackCursor {
    /// Loaded frames advanced per output frame
    step: f64,
    position: f64,
    start: usize,
    /// Exclusive end; `None` plays to the end of the loaded prefix
    end: Option<usize>,
}

impl PlaybackCursor {
    pub fn new(sample_rate: u32, output_rate: u32, range: Option<(usize, usize)>) -> Self {
        let step = if sample_rate == 0 || output_rate == 0 {
            1.0
        } else {
            sample_rate as f64 / output_rate as f64
        };
        let (start, end) = match range {
            Some((start, end)) => (start.min(end), Some(start.max(end))),
            None => (0, None),
        };
        Self {
            step,
            position: start as f64,
            start,
            end,
        }
    }

    /// Current frame index
    pub fn position(&self) -> usize {
        self.position as usize
    }

    /// Fill `out` (interleaved, `out_channels` wide). Returns false once
    /// the end was reached without looping; the rest of `out` is silence.
    pub fn render(
        &mut self,
        sample: &SampleState,
        out: &mut [f32],
        out_channels: usize,
        volume: f32,
        looping: bool,
    ) -> bool {
        let out_channels = out_channels.max(1);
        let loaded = sample.loaded();
        let channels = sample.channels().max(1) as usize;
        let end = self.end.unwrap_or(usize::MAX).min(sample.frames());
        let start = self.start.min(end);
        let gain = volume / 32768.0;

        let mut written = 0;
        let mut finished = false;
        for frame in out.chunks_mut(out_channels) {
            let mut index = self.position as usize;
            if index >= end {
                if looping && end > start {
                    self.position = start as f64;
                    index = start;
                } else {
                    finished = true;
                    break;
                }
            }

            let base = index * channels;
            let left = loaded[base] as f32 * gain;
            let right = if channels > 1 {
                loaded[base + 1] as f32 * gain
            } else {
                left
            };
            frame[0] = left;
            if out_channels > 1 {
                frame[1] = right;
            }
            for ch in frame.iter_mut().skip(2) {
                *ch = if channels > 1 { 0.0 } else { left };
            }
            self.position += self.step;
            written += 1;
        }

        if finished {
            out[written * out_channels..].fill(0.0);
            return false;
        }
        true
    }
}
