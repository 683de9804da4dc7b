//! Waveform widgets for the audition sample editor
//!
//! ## Architecture (iced 0.14 patterns)
//!
//! - **State structs**: pure data ([`ViewportState`], [`Selection`])
//! - **Rendering**: [`build_waveform`] reduces the locked sample to a
//!   [`WaveformImage`]; [`paint_waveform`] draws it through the
//!   [`WaveformPainter`] trait with the lock released
//! - **Canvas Program**: [`WaveformCanvas`] translates pointer events into
//!   [`WaveformEvent`]s and paints the image through a geometry cache
//! - **View function**: [`waveform_editor`] wraps the canvas into an `Element`

pub mod selection;
pub mod theme;
pub mod view;
pub mod viewport;
pub mod waveform;

pub use selection::Selection;
pub use theme::WaveformStyle;
pub use view::waveform_editor;
pub use viewport::{ViewportState, ZoomDirection, BORDER_INSET};
pub use waveform::{
    build_waveform, paint_waveform, render_waveform, RenderStats, WaveformAction,
    WaveformCanvas, WaveformEvent, WaveformImage, WaveformPainter, WAVEFORM_HEIGHT,
};
