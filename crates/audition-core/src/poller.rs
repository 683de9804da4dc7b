//! Readiness poller
//!
//! Decode progress happens on the loader thread; the UI learns about it by
//! polling. The poller is a timer handle owned by the UI thread: the front
//! end calls [`ReadinessPoller::tick`] every [`ReadinessPoller::interval`]
//! while [`ReadinessPoller::is_ticking`] is true. Each tick takes one
//! non-blocking snapshot of the shared sample and decides whether enough
//! audio exists to enable playback.
//!
//! Ready means either `READY_THRESHOLD_FRAMES` frames are loaded, or the
//! load has finished with at least one frame. The transition to ready is
//! one-shot: the poller reports it once and stops ticking.

use std::time::Duration;

use crate::sample::{SampleSnapshot, SharedSample};
use crate::types::{effective_channels, READY_THRESHOLD_FRAMES};

/// Default tick period
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timer state of the poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Never started, or stopped before becoming ready
    Idle,
    /// Waiting for enough audio
    Ticking,
    /// Reported ready; will not tick again until restarted
    Finished,
}

/// What one tick observed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollReport {
    pub snapshot: SampleSnapshot,
    /// Effective channel count of the loaded data
    pub channels: u16,
}

/// Result of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PollOutcome {
    /// The poller isn't ticking
    Idle,
    /// The loader held the lock; try again next tick
    Busy,
    /// Not enough audio yet
    Loading(PollReport),
    /// Enough audio to play. Reported exactly once per start.
    Ready(PollReport),
}

/// Frames-or-finished readiness rule
pub fn is_ready_to_play(frames: usize, active: bool, threshold: usize) -> bool {
    frames >= threshold || (!active && frames > 0)
}

/// Timer-driven readiness check for the current load.
#[derive(Debug, Clone)]
pub struct ReadinessPoller {
    interval: Duration,
    threshold: usize,
    state: PollerState,
    target_channels: u16,
}

impl Default for ReadinessPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl ReadinessPoller {
    pub fn new(interval: Duration) -> Self {
        Self::with_threshold(interval, READY_THRESHOLD_FRAMES)
    }

    pub fn with_threshold(interval: Duration, threshold: usize) -> Self {
        Self {
            interval,
            threshold,
            state: PollerState::Idle,
            target_channels: 2,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn state(&self) -> PollerState {
        self.state
    }

    pub fn is_ticking(&self) -> bool {
        self.state == PollerState::Ticking
    }

    /// Arm the timer for a load targeting `target_channels`. Idempotent.
    pub fn start(&mut self, target_channels: u16) {
        if self.state != PollerState::Ticking {
            log::debug!("ReadinessPoller: started ({:?} interval)", self.interval);
        }
        self.target_channels = target_channels;
        self.state = PollerState::Ticking;
    }

    /// Cancel the timer. Idempotent.
    pub fn stop(&mut self) {
        if self.state == PollerState::Ticking {
            log::debug!("ReadinessPoller: stopped");
            self.state = PollerState::Idle;
        }
    }

    /// One timer tick. Never blocks on the loader.
    pub fn tick(&mut self, sample: &SharedSample) -> PollOutcome {
        if self.state != PollerState::Ticking {
            return PollOutcome::Idle;
        }

        let Some(snapshot) = sample.try_snapshot() else {
            return PollOutcome::Busy;
        };

        let report = PollReport {
            snapshot,
            channels: effective_channels(self.target_channels, snapshot.info.channels),
        };

        if is_ready_to_play(snapshot.frames, snapshot.active, self.threshold) {
            log::info!(
                "ReadinessPoller: ready with {} frames (loading: {})",
                snapshot.frames,
                snapshot.active
            );
            self.state = PollerState::Finished;
            PollOutcome::Ready(report)
        } else {
            PollOutcome::Loading(report)
        }
    }
}
