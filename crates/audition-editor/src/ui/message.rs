//! Application messages for the audition editor

use audition_widgets::WaveformEvent;

#[derive(Debug, Clone)]
pub enum Message {
    /// Readiness poller tick
    Tick,
    /// Frame timer while a load is running
    Frame,
    /// Path text input edited
    PathChanged(String),
    /// Load the path from the text input
    Open,
    Play,
    Stop,
    LoopToggled(bool),
    AutoplayToggled(bool),
    MixToggled(bool),
    VolumeChanged(f32),
    /// Gesture on the waveform canvas
    Waveform(WaveformEvent),
}
