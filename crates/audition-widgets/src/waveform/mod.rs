//! Waveform display: envelope computation, rendering and the iced canvas

mod canvas;
mod envelope;
mod render;

pub use canvas::{
    translate_event, WaveformAction, WaveformCanvas, WaveformEvent, WaveformInteraction,
    SCROLL_PIXELS_PER_LINE,
};
pub use envelope::{column_envelope, ChannelEnvelope, ColumnEnvelope};
pub use render::{
    build_waveform, paint_waveform, render_waveform, ImageColumn, LaneLayout, RenderStats,
    WaveformImage, WaveformPainter,
};

/// Height of the waveform canvas in pixels
pub const WAVEFORM_HEIGHT: f32 = 240.0;
