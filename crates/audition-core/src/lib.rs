//! Audition Core - sample streaming and playback for the audition sample editor
//!
//! The editor loads a sample on a background thread while the UI thread
//! renders and plays whatever prefix has already arrived. This crate owns
//! everything below the UI:
//!
//! - [`sample`]: the lock-guarded sample buffer shared by loader, renderer and playback
//! - [`audio_file`]: decode providers (RIFF/WAVE, symphonia) producing 16-bit frames
//! - [`loader`]: the cancellable background loader
//! - [`poller`]: the readiness poller that enables playback early
//! - [`playback`]: playback engines (cpal output, silent fallback)
//! - [`config`]: YAML config I/O

pub mod audio_file;
pub mod config;
pub mod loader;
pub mod playback;
pub mod poller;
pub mod sample;
pub mod types;

pub use types::*;
