//! Main iced application for the audition editor
//!
//! Layout, top to bottom:
//! - path input with the Open button
//! - transport (Play / Stop, Loop, Autoplay, Mix, volume)
//! - sample properties (hidden until the first frame is loaded)
//! - the waveform canvas
//! - status line

use std::time::Duration;

use iced::time;
use iced::widget::canvas::Cache;
use iced::widget::{button, column, container, row, slider, text, text_input, toggler, Space};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};

use audition_widgets::waveform_editor;

use super::message::Message;
use crate::session::EditorSession;

/// Frame timer period while a load or a redraw is pending (~30fps)
const FRAME_INTERVAL: Duration = Duration::from_millis(33);

/// Application state
pub struct AuditionApp {
    session: EditorSession,
    /// Waveform geometry, cleared only when the session rebuilds its image
    waveform_cache: Cache,
    /// Number of times the waveform geometry was invalidated
    waveform_generation: u64,
    /// Contents of the path input
    path_input: String,
    status: String,
}

impl AuditionApp {
    /// Create the application, loading `initial` when given
    pub fn new(session: EditorSession, initial: Option<String>) -> (Self, Task<Message>) {
        let app = Self {
            session,
            waveform_cache: Cache::new(),
            waveform_generation: 0,
            path_input: initial.clone().unwrap_or_default(),
            status: String::from("No sample"),
        };
        let task = if initial.is_some() {
            Task::done(Message::Open)
        } else {
            Task::none()
        };
        (app, task)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                self.session.tick();
                if self.session.controls_enabled() {
                    self.status = String::from("Ready");
                }
            }
            Message::Frame => {
                self.session.on_frame();
            }
            Message::PathChanged(path) => {
                self.path_input = path;
            }
            Message::Open => {
                let path = self.path_input.trim().to_string();
                if path.is_empty() {
                    self.session.clear();
                    self.status = String::from("No sample");
                } else {
                    self.status = match self.session.open(&path) {
                        Ok(()) => format!("Loading {}", path),
                        Err(e) => e.to_string(),
                    };
                }
            }
            Message::Play => {
                self.session.play();
            }
            Message::Stop => self.session.stop(),
            Message::LoopToggled(looping) => self.session.set_loop(looping),
            Message::AutoplayToggled(autoplay) => self.session.set_autoplay(autoplay),
            Message::MixToggled(mix) => {
                if let Err(e) = self.session.set_mix(mix) {
                    self.status = e.to_string();
                }
            }
            Message::VolumeChanged(volume) => self.session.set_volume(volume),
            Message::Waveform(event) => self.session.handle_waveform(event),
        }
        if self.session.sync_waveform() {
            self.waveform_cache.clear();
            self.waveform_generation += 1;
        }
        Task::none()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let poll = if self.session.poller().is_ticking() {
            time::every(self.session.poller().interval()).map(|_| Message::Tick)
        } else {
            Subscription::none()
        };
        let frame = if self.session.is_loading() || self.session.waveform_pending() {
            time::every(FRAME_INTERVAL).map(|_| Message::Frame)
        } else {
            Subscription::none()
        };
        Subscription::batch([poll, frame])
    }

    pub fn view(&self) -> Element<'_, Message> {
        let open_row = row![
            text_input("Sample path", &self.path_input)
                .on_input(Message::PathChanged)
                .on_submit(Message::Open),
            button(text("Open")).on_press(Message::Open),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let waveform = waveform_editor(
            self.session.waveform(),
            &self.waveform_cache,
            self.session.viewport(),
            Message::Waveform,
        );

        column![
            open_row,
            self.view_transport(),
            self.view_properties(),
            waveform,
            text(&self.status).size(12),
        ]
        .spacing(12)
        .padding(12)
        .into()
    }

    fn view_transport(&self) -> Element<'_, Message> {
        let enabled = self.session.controls_enabled();
        let config = self.session.config();

        row![
            button(text("Play")).on_press_maybe(enabled.then_some(Message::Play)),
            button(text("Stop")).on_press_maybe(enabled.then_some(Message::Stop)),
            toggler(config.playback.loop_playback).on_toggle(Message::LoopToggled),
            text("Loop"),
            toggler(config.playback.autoplay).on_toggle(Message::AutoplayToggled),
            text("Autoplay"),
            toggler(config.loading.mix).on_toggle(Message::MixToggled),
            text("Mix"),
            Space::new().width(Length::Fill),
            text("Volume"),
            slider(0.0..=1.0, config.playback.volume, Message::VolumeChanged)
                .step(0.01)
                .width(160),
        ]
        .spacing(10)
        .align_y(Alignment::Center)
        .into()
    }

    fn view_properties(&self) -> Element<'_, Message> {
        let props = self.session.properties();
        if !props.visible {
            return Space::new().height(Length::Fixed(16.0)).into();
        }

        let mut fields = row![
            text(format!("Frames: {}", props.frames)),
            text(format!("Duration: {}", props.duration)),
            text(format!("Sample rate: {}", props.samplerate)),
            text(format!("Channels: {}", props.channels)),
        ]
        .spacing(20);
        if let Some(bitdepth) = &props.bitdepth {
            fields = fields.push(text(format!("Bit depth: {}", bitdepth)));
        }

        container(fields.align_y(Alignment::Center)).into()
    }

    pub fn theme(&self) -> Theme {
        Theme::Dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use audition_core::audio_file::MemoryDecodeProvider;
    use audition_core::playback::NullPlayback;
    use audition_widgets::{WaveformAction, WaveformEvent, ZoomDirection};
    use std::time::Instant;

    fn app() -> AuditionApp {
        app_with(MemoryDecodeProvider::new(vec![100, -100, 50, -50], 1, 48000))
    }

    fn app_with(provider: MemoryDecodeProvider) -> AuditionApp {
        let session = EditorSession::new(
            Box::new(NullPlayback::new()),
            Box::new(provider),
            EditorConfig::default(),
        );
        AuditionApp::new(session, None).0
    }

    #[test]
    fn test_open_starts_polling() {
        let mut app = app();
        let _ = app.update(Message::PathChanged("sample.wav".into()));
        let _ = app.update(Message::Open);
        assert!(app.session.poller().is_ticking());
        assert!(app.status.starts_with("Loading"));
    }

    #[test]
    fn test_empty_path_clears() {
        let mut app = app();
        let _ = app.update(Message::PathChanged("   ".into()));
        let _ = app.update(Message::Open);
        assert!(app.session.path().is_none());
        assert_eq!(app.status, "No sample");
    }

    #[test]
    fn test_toggles_update_config() {
        let mut app = app();
        let _ = app.update(Message::LoopToggled(true));
        let _ = app.update(Message::VolumeChanged(0.25));
        let _ = app.update(Message::AutoplayToggled(false));
        let config = app.session.config();
        assert!(config.playback.loop_playback);
        assert_eq!(config.playback.volume, 0.25);
        assert!(!config.playback.autoplay);
    }

    #[test]
    fn test_waveform_geometry_cleared_only_on_redraw() {
        let samples: Vec<i16> = (0..2000).map(|i| (i % 200) as i16 * 100).collect();
        let mut app = app_with(MemoryDecodeProvider::new(samples, 1, 48000));
        let _ = app.update(Message::Waveform(WaveformEvent {
            action: WaveformAction::Resize,
            surface_width: 202,
        }));
        let _ = app.update(Message::PathChanged("sample.wav".into()));
        let _ = app.update(Message::Open);

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.session.sample().snapshot().active {
            assert!(Instant::now() < deadline, "load did not finish");
            std::thread::sleep(Duration::from_millis(1));
        }
        let _ = app.update(Message::Frame);
        assert!(!app.session.waveform().columns.is_empty());
        assert!(!app.session.waveform_pending());
        let generation = app.waveform_generation;

        // Frames and transport changes reuse the cached geometry
        let _ = app.update(Message::Frame);
        let _ = app.update(Message::Stop);
        let _ = app.update(Message::VolumeChanged(0.5));
        assert_eq!(app.waveform_generation, generation);

        let _ = app.update(Message::Waveform(WaveformEvent {
            action: WaveformAction::Zoom {
                x: 0.0,
                direction: ZoomDirection::In,
            },
            surface_width: 202,
        }));
        assert_eq!(app.waveform_generation, generation + 1);
        let _ = app.update(Message::Frame);
        assert_eq!(app.waveform_generation, generation + 1);
    }
}
