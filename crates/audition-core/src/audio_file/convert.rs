//! Channel reduction and streaming rate conversion
//!
//! Sources feed normalized interleaved `f32` frames in arbitrary block
//! sizes; the converter emits interleaved 16-bit frames in the load
//! target's channel layout and rate. Rate conversion is linear
//! interpolation that carries its read position and the unconsumed tail
//! across blocks, so block boundaries don't produce clicks or drift.

use crate::types::{effective_channels, LoadTarget};

/// Stateful converter from source frames to loaded frames.
#[derive(Debug, Clone)]
pub struct FrameConverter {
    in_channels: usize,
    out_channels: usize,
    /// Source frames advanced per output frame
    step: f64,
    /// Read position into `pending`, in frames
    position: f64,
    /// Channel-reduced frames not yet fully consumed
    pending: Vec<f32>,
}

impl FrameConverter {
    pub fn new(in_channels: u16, in_rate: u32, target: &LoadTarget) -> Self {
        let out_rate = if target.samplerate == 0 { in_rate } else { target.samplerate };
        let step = if in_rate == 0 || out_rate == 0 {
            1.0
        } else {
            in_rate as f64 / out_rate as f64
        };
        Self {
            in_channels: in_channels.max(1) as usize,
            out_channels: effective_channels(target.channels, in_channels) as usize,
            step,
            position: 0.0,
            pending: Vec::new(),
        }
    }

    pub fn out_channels(&self) -> u16 {
        self.out_channels as u16
    }

    /// True when no rate conversion happens
    pub fn is_passthrough(&self) -> bool {
        self.step == 1.0
    }

    /// Convert a block of interleaved source samples in [-1, 1].
    /// Returns the number of frames appended to `out`.
    pub fn push(&mut self, input: &[f32], out: &mut Vec<i16>) -> usize {
        self.reduce_channels(input);

        if self.is_passthrough() {
            let frames = self.pending.len() / self.out_channels;
            out.extend(self.pending.drain(..).map(to_i16));
            return frames;
        }

        let oc = self.out_channels;
        let frames = self.pending.len() / oc;
        let mut produced = 0;
        while self.position + 1.0 < frames as f64 {
            let i0 = self.position.floor() as usize;
            let t = (self.position - i0 as f64) as f32;
            for c in 0..oc {
                let a = self.pending[i0 * oc + c];
                let b = self.pending[(i0 + 1) * oc + c];
                out.push(to_i16(a + (b - a) * t));
            }
            produced += 1;
            self.position += self.step;
        }

        let consumed = (self.position.floor() as usize).min(frames);
        self.pending.drain(..consumed * oc);
        self.position -= consumed as f64;
        produced
    }

    /// Emit whatever the interpolator still holds. Call once at end of stream.
    pub fn finish(&mut self, out: &mut Vec<i16>) -> usize {
        let oc = self.out_channels;
        let frames = self.pending.len() / oc;
        let mut produced = 0;
        while frames > 0 && self.position < frames as f64 {
            let i0 = self.position.floor() as usize;
            let i1 = (i0 + 1).min(frames - 1);
            let t = (self.position - i0 as f64) as f32;
            for c in 0..oc {
                let a = self.pending[i0 * oc + c];
                let b = self.pending[i1 * oc + c];
                out.push(to_i16(a + (b - a) * t));
            }
            produced += 1;
            self.position += self.step;
        }
        self.pending.clear();
        self.position = 0.0;
        produced
    }

    fn reduce_channels(&mut self, input: &[f32]) {
        let ic = self.in_channels;
        if self.out_channels == ic {
            let whole = input.len() / ic * ic;
            self.pending.extend_from_slice(&input[..whole]);
            return;
        }
        let scale = 1.0 / ic as f32;
        self.pending
            .extend(input.chunks_exact(ic).map(|frame| frame.iter().sum::<f32>() * scale));
    }
}

/// Convert a normalized sample to 16-bit, saturating at full scale.
pub(crate) fn to_i16(value: f32) -> i16 {
    (value * 32768.0).round().clamp(-32768.0, 32767.0) as i16
}

/// Map a frame index between sample rates, rounding to nearest.
pub fn map_frame_between_rates(frame: u64, in_rate: u32, out_rate: u32) -> u64 {
    if in_rate == 0 || out_rate == 0 || in_rate == out_rate {
        return frame;
    }
    let in_rate = in_rate as u64;
    (frame * out_rate as u64 + in_rate / 2) / in_rate
}
