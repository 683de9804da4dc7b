//! Audition editor
//!
//! Composes the loader, poller, viewport, selection and playback into one
//! [`session::EditorSession`] and wraps it into an iced application.

pub mod config;
pub mod properties;
pub mod redraw;
pub mod session;
pub mod ui;

pub use config::EditorConfig;
pub use session::{DeviceCaps, EditorSession};
