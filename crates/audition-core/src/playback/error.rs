//! Errors raised while opening the output device

use thiserror::Error;

/// Why [`CpalPlayback`](super::CpalPlayback) could not start. The editor
/// falls back to silent mode on any of these.
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("No output device on the default host")]
    NoDevice,

    /// The device would not report a default output format
    #[error("Output device has no usable format: {0}")]
    Config(String),

    #[error("Could not create output stream: {0}")]
    StreamBuild(String),

    #[error("Output stream refused to start: {0}")]
    StreamPlay(String),
}

pub type PlaybackResult<T> = Result<T, PlaybackError>;
