//! Colors of the waveform editor

use iced::Color;

/// Waveform background
pub const BACKGROUND_COLOR: Color = Color::from_rgb(0.1, 0.1, 0.12);

/// Envelope strokes
pub const WAVEFORM_COLOR: Color = Color::from_rgb(0.2, 0.8, 0.4);

/// Alpha of the selection overlay (drawn in the waveform color)
pub const SELECTION_ALPHA: f32 = 0.15;

/// Colors used by the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformStyle {
    pub background: Color,
    pub waveform: Color,
    pub selection: Color,
}

impl WaveformStyle {
    /// Style with the selection overlay derived from the waveform color
    pub fn new(background: Color, waveform: Color) -> Self {
        Self {
            background,
            waveform,
            selection: Color {
                a: SELECTION_ALPHA,
                ..waveform
            },
        }
    }
}

impl Default for WaveformStyle {
    fn default() -> Self {
        Self::new(BACKGROUND_COLOR, WAVEFORM_COLOR)
    }
}
