//! CPAL output backend
//!
//! ```text
//! ┌──────────────────┐  play/stop (Mutex)   ┌─────────────────────┐
//! │     UI Thread    │─────────────────────►│   PlaybackShared    │
//! └──────────────────┘  volume/loop atomics └──────────┬──────────┘
//!                                                      │ try_lock
//!                                                      ▼
//! ┌──────────────────┐       try_lock       ┌─────────────────────┐
//! │   SharedSample   │◄─────────────────────│  CPAL Audio Thread  │
//! └──────────────────┘                      └─────────────────────┘
//! ```
//!
//! The callback only ever uses `try_lock`; when either lock is busy the
//! block is silence.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};

use super::cursor::PlaybackCursor;
use super::error::{PlaybackError, PlaybackResult};
use super::{PlaybackEngine, PlaybackRequest};
use crate::sample::SharedSample;

struct Voice {
    sample: Arc<SharedSample>,
    cursor: PlaybackCursor,
}

struct PlaybackShared {
    voice: Mutex<Option<Voice>>,
    playing: AtomicBool,
    looping: AtomicBool,
    /// f32 bits
    volume: AtomicU32,
}

impl PlaybackShared {
    fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    fn set_voice(&self, voice: Option<Voice>) {
        *self.voice.lock().unwrap_or_else(PoisonError::into_inner) = voice;
    }
}

/// Plays through the default output device.
pub struct CpalPlayback {
    _stream: Stream,
    shared: Arc<PlaybackShared>,
    sample_rate: u32,
}

impl CpalPlayback {
    /// Open the default output device and start a (silent) stream.
    pub fn new() -> PlaybackResult<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(PlaybackError::NoDevice)?;
        let supported = device
            .default_output_config()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;
        let sample_rate = supported.sample_rate().0;
        let config: StreamConfig = supported.config();

        let shared = Arc::new(PlaybackShared {
            voice: Mutex::new(None),
            playing: AtomicBool::new(false),
            looping: AtomicBool::new(false),
            volume: AtomicU32::new(1.0f32.to_bits()),
        });

        let stream = build_output_stream(&device, &config, Arc::clone(&shared))?;
        stream
            .play()
            .map_err(|e| PlaybackError::StreamPlay(e.to_string()))?;

        log::info!(
            "CpalPlayback: output stream started ({} Hz, {} ch)",
            sample_rate,
            config.channels
        );

        Ok(Self {
            _stream: stream,
            shared,
            sample_rate,
        })
    }
}

impl PlaybackEngine for CpalPlayback {
    fn is_available(&self) -> bool {
        true
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn play(&mut self, request: PlaybackRequest) {
        log::debug!("CpalPlayback: play {:?}", request.range);
        let cursor = PlaybackCursor::new(request.sample_rate, self.sample_rate, request.range);
        self.shared.set_voice(Some(Voice {
            sample: request.sample,
            cursor,
        }));
        self.shared.playing.store(true, Ordering::Release);
    }

    fn stop(&mut self) {
        self.shared.playing.store(false, Ordering::Release);
        self.shared.set_voice(None);
    }

    fn set_volume(&mut self, volume: f32) {
        self.shared
            .volume
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    fn set_loop(&mut self, looping: bool) {
        self.shared.looping.store(looping, Ordering::Relaxed);
    }

    fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Acquire)
    }
}

fn build_output_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    shared: Arc<PlaybackShared>,
) -> PlaybackResult<Stream> {
    let channels = config.channels as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                if !shared.playing.load(Ordering::Acquire) {
                    data.fill(0.0);
                    return;
                }
                let Ok(mut voice) = shared.voice.try_lock() else {
                    data.fill(0.0);
                    return;
                };
                let Some(voice) = voice.as_mut() else {
                    data.fill(0.0);
                    return;
                };
                let Some(state) = voice.sample.try_lock() else {
                    data.fill(0.0);
                    return;
                };

                let still_playing = voice.cursor.render(
                    &state,
                    data,
                    channels,
                    shared.volume(),
                    shared.looping.load(Ordering::Relaxed),
                );
                if !still_playing {
                    shared.playing.store(false, Ordering::Release);
                }
            },
            move |err| {
                log::error!("CpalPlayback: stream error: {}", err);
            },
            None,
        )
        .map_err(|e| PlaybackError::StreamBuild(e.to_string()))
}
