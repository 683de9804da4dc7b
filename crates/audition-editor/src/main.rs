//! Audition - sample editor
//!
//! Entry point for the GUI application. It:
//! 1. Loads the editor configuration
//! 2. Opens the default audio output (falls back to silent mode)
//! 3. Launches the iced GUI, loading the sample named on the command line

use std::cell::RefCell;

use iced::Size;

use audition_core::audio_file::AutoDecodeProvider;
use audition_core::playback::{CpalPlayback, NullPlayback, PlaybackEngine};
use audition_editor::config::{default_config_path, load_config};
use audition_editor::ui::AuditionApp;
use audition_editor::{EditorConfig, EditorSession};

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Audition starting up");

    let config_path = default_config_path();
    let config: EditorConfig = load_config(&config_path);
    let initial = std::env::args().nth(1);

    let playback: Box<dyn PlaybackEngine> = match CpalPlayback::new() {
        Ok(playback) => Box::new(playback),
        Err(e) => {
            log::warn!("No audio output ({}), playback disabled", e);
            Box::new(NullPlayback::new())
        }
    };

    let session = EditorSession::new(playback, Box::new(AutoDecodeProvider::new()), config)
        .with_config_path(config_path);

    // The boot closure must be Fn; it runs once and takes the session.
    let session_cell = RefCell::new(Some(session));

    iced::application(
        move || {
            let session = session_cell.borrow_mut().take().unwrap_or_else(|| {
                EditorSession::new(
                    Box::new(NullPlayback::new()),
                    Box::new(AutoDecodeProvider::new()),
                    EditorConfig::default(),
                )
            });
            AuditionApp::new(session, initial.clone())
        },
        AuditionApp::update,
        AuditionApp::view,
    )
    .subscription(AuditionApp::subscription)
    .theme(AuditionApp::theme)
    .title("Audition")
    .window_size(Size::new(1000.0, 480.0))
    .run()
}
