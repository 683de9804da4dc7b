//! Per-column amplitude envelope
//!
//! Each pixel column summarizes its frames as the average of the positive
//! samples and the average of the negative samples, per channel. Zeros
//! count toward neither. This is a single pass over the frames with no
//! buffering, at the cost of drawing averages rather than true peaks.

/// Averages for one channel of one column
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelEnvelope {
    /// Average of the positive samples (0 when none)
    pub positive: f64,
    /// Average of the negative samples (0 when none)
    pub negative: f64,
}

/// Averages for both lanes of one column. `right` stays zero for mono.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ColumnEnvelope {
    pub left: ChannelEnvelope,
    pub right: ChannelEnvelope,
}

#[derive(Default)]
struct Accumulator {
    pos_sum: i64,
    pos_count: u32,
    neg_sum: i64,
    neg_count: u32,
}

impl Accumulator {
    fn add(&mut self, value: i16) {
        if value > 0 {
            self.pos_sum += value as i64;
            self.pos_count += 1;
        } else if value < 0 {
            self.neg_sum += value as i64;
            self.neg_count += 1;
        }
    }

    fn finish(&self) -> ChannelEnvelope {
        let avg = |sum: i64, count: u32| if count == 0 { 0.0 } else { sum as f64 / count as f64 };
        ChannelEnvelope {
            positive: avg(self.pos_sum, self.pos_count),
            negative: avg(self.neg_sum, self.neg_count),
        }
    }
}

/// Envelope of frames `[first, first + count)` of an interleaved buffer.
///
/// Returns `None` when any frame of the range is beyond `loaded_frames`.
pub fn column_envelope(
    loaded: &[i16],
    channels: usize,
    loaded_frames: usize,
    first: usize,
    count: usize,
) -> Option<ColumnEnvelope> {
    let end = first.checked_add(count)?;
    let channels = channels.max(1);
    if end > loaded_frames || end * channels > loaded.len() {
        return None;
    }

    let mut left = Accumulator::default();
    let mut right = Accumulator::default();
    for frame in loaded[first * channels..end * channels].chunks_exact(channels) {
        left.add(frame[0]);
        if channels > 1 {
            right.add(frame[1]);
        }
    }

    Some(ColumnEnvelope {
        left: left.finish(),
        right: right.finish(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_signs_split_per_channel() {
        // Left carries +100, right carries -50.
        let loaded: Vec<i16> = [100, -50].repeat(8);
        let env = column_envelope(&loaded, 2, 8, 0, 8).unwrap();
        assert_eq!(env.left.positive, 100.0);
        assert_eq!(env.left.negative, 0.0);
        assert_eq!(env.right.positive, 0.0);
        assert_eq!(env.right.negative, -50.0);
    }

    #[test]
    fn test_zeros_excluded_from_both_averages() {
        let loaded = [0, 300, 0, -200, 100, 0];
        let env = column_envelope(&loaded, 1, 6, 0, 6).unwrap();
        assert_eq!(env.left.positive, 200.0);
        assert_eq!(env.left.negative, -200.0);
        assert_eq!(env.right, ChannelEnvelope::default());
    }

    #[test]
    fn test_silence_gives_zero_envelope() {
        let env = column_envelope(&[0; 10], 1, 10, 2, 5).unwrap();
        assert_eq!(env, ColumnEnvelope::default());
    }

    #[test]
    fn test_range_past_loaded_frames_is_unavailable() {
        let loaded = [1i16; 20];
        assert!(column_envelope(&loaded, 2, 10, 8, 2).is_some());
        assert!(column_envelope(&loaded, 2, 10, 9, 2).is_none());
        assert!(column_envelope(&loaded, 1, 15, 10, 10).is_none());
    }
}
