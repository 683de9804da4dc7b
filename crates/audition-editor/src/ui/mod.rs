//! UI module for the audition editor
//!
//! Built with iced. The application holds one [`EditorSession`] and
//! forwards every message to it; timers drive the readiness poller and
//! the redraws requested by the loader.
//!
//! [`EditorSession`]: crate::session::EditorSession

pub mod app;
pub mod message;

pub use app::AuditionApp;
pub use message::Message;
