//! Canvas Program for the waveform editor
//!
//! Pointer and wheel events are translated into [`WaveformEvent`]s that
//! carry the visible x coordinate and the surface width. The session maps
//! x to frames through the same [`ViewportState`] the renderer uses. Any
//! other event reports a [`WaveformAction::Resize`] when the canvas width
//! no longer matches the viewport.

use iced::widget::canvas::{self, Cache, Event, Frame, Geometry, Path, Program, Stroke};
use iced::{keyboard, mouse, Color, Point, Rectangle, Size, Theme};

use super::render::{paint_waveform, WaveformImage, WaveformPainter};
use crate::theme::WaveformStyle;
use crate::viewport::{ViewportState, ZoomDirection};

/// Pixels scrolled per wheel line
pub const SCROLL_PIXELS_PER_LINE: f32 = 20.0;

/// Canvas state tracking the drag and the modifier keys
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveformInteraction {
    pub selecting: bool,
    pub modifiers: keyboard::Modifiers,
}

/// User gesture on the waveform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaveformAction {
    /// Left button down at visible x
    Press { x: f32 },
    /// Pointer moved to x while the button is held
    Drag { x: f32 },
    Release,
    /// Ctrl + vertical wheel at x
    Zoom { x: f32, direction: ZoomDirection },
    /// Horizontal wheel, in pixels
    Scroll { dx: f32 },
    /// The canvas width differs from the viewport's surface width
    Resize,
}

/// A gesture plus the width of the surface it happened on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformEvent {
    pub action: WaveformAction,
    pub surface_width: u32,
}

/// Translate a raw canvas event. `local` is the cursor relative to the
/// canvas origin (it may lie outside while dragging).
pub fn translate_event(
    interaction: &mut WaveformInteraction,
    event: &Event,
    local: Option<Point>,
    inside: bool,
) -> Option<WaveformAction> {
    match event {
        Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
            interaction.modifiers = *modifiers;
            None
        }
        Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) if inside => {
            let position = local?;
            interaction.selecting = true;
            Some(WaveformAction::Press { x: position.x })
        }
        Event::Mouse(mouse::Event::CursorMoved { .. }) if interaction.selecting => {
            local.map(|position| WaveformAction::Drag { x: position.x })
        }
        Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) if interaction.selecting => {
            interaction.selecting = false;
            Some(WaveformAction::Release)
        }
        Event::Mouse(mouse::Event::WheelScrolled { delta }) if inside => {
            let (dx, dy) = match delta {
                mouse::ScrollDelta::Lines { x, y } => {
                    (x * SCROLL_PIXELS_PER_LINE, y * SCROLL_PIXELS_PER_LINE)
                }
                mouse::ScrollDelta::Pixels { x, y } => (*x, *y),
            };
            if interaction.modifiers.control() {
                let position = local?;
                ZoomDirection::from_wheel(dy).map(|direction| WaveformAction::Zoom {
                    x: position.x,
                    direction,
                })
            } else if dx != 0.0 {
                Some(WaveformAction::Scroll { dx: -dx })
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Canvas program painting a prebuilt [`WaveformImage`].
///
/// Geometry lives in `cache`; the owner clears it when the image changes,
/// so an unchanged waveform is never re-tessellated and drawing never
/// touches the sample lock.
pub struct WaveformCanvas<'a, Message, F>
where
    F: Fn(WaveformEvent) -> Message,
{
    pub image: &'a WaveformImage,
    pub cache: &'a Cache,
    pub viewport: ViewportState,
    pub style: WaveformStyle,
    pub on_event: F,
}

impl<'a, Message, F> Program<Message> for WaveformCanvas<'a, Message, F>
where
    Message: Clone,
    F: Fn(WaveformEvent) -> Message,
{
    type State = WaveformInteraction;

    fn update(
        &self,
        interaction: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let local = cursor
            .position()
            .map(|p| Point::new(p.x - bounds.x, p.y - bounds.y));
        let inside = cursor.is_over(bounds);
        let surface_width = bounds.width.max(0.0) as u32;

        let action = match translate_event(interaction, event, local, inside) {
            Some(action) => action,
            None if surface_width != self.viewport.surface_width() => WaveformAction::Resize,
            None => return None,
        };
        let event = WaveformEvent {
            action,
            surface_width,
        };
        Some(canvas::Action::publish((self.on_event)(event)))
    }

    fn mouse_interaction(
        &self,
        interaction: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if interaction.selecting || cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }

    fn draw(
        &self,
        _interaction: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let geometry = self.cache.draw(renderer, bounds.size(), |frame| {
            let mut painter = FramePainter { frame };
            paint_waveform(&mut painter, self.image, bounds.width, bounds.height, &self.style);
        });
        vec![geometry]
    }
}

struct FramePainter<'f> {
    frame: &'f mut Frame,
}

impl WaveformPainter for FramePainter<'_> {
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.frame
            .fill_rectangle(Point::new(x, y), Size::new(width, height), color);
    }

    fn vertical_line(&mut self, x: f32, y0: f32, y1: f32, color: Color) {
        let line = Path::line(Point::new(x + 0.5, y0), Point::new(x + 0.5, y1));
        self.frame
            .stroke(&line, Stroke::default().with_color(color).with_width(1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press() -> Event {
        Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left))
    }

    fn release() -> Event {
        Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))
    }

    fn moved(x: f32) -> Event {
        Event::Mouse(mouse::Event::CursorMoved {
            position: Point::new(x, 5.0),
        })
    }

    fn wheel(x: f32, y: f32) -> Event {
        Event::Mouse(mouse::Event::WheelScrolled {
            delta: mouse::ScrollDelta::Lines { x, y },
        })
    }

    #[test]
    fn test_press_drag_release() {
        let mut interaction = WaveformInteraction::default();
        let at = |x: f32| Some(Point::new(x, 5.0));

        assert_eq!(
            translate_event(&mut interaction, &press(), at(40.0), true),
            Some(WaveformAction::Press { x: 40.0 })
        );
        assert_eq!(
            translate_event(&mut interaction, &moved(-10.0), at(-10.0), false),
            Some(WaveformAction::Drag { x: -10.0 })
        );
        assert_eq!(
            translate_event(&mut interaction, &release(), at(-10.0), false),
            Some(WaveformAction::Release)
        );
        assert_eq!(translate_event(&mut interaction, &moved(20.0), at(20.0), true), None);
    }

    #[test]
    fn test_press_outside_is_ignored() {
        let mut interaction = WaveformInteraction::default();
        assert_eq!(
            translate_event(&mut interaction, &press(), Some(Point::new(-5.0, 0.0)), false),
            None
        );
        assert!(!interaction.selecting);
    }

    #[test]
    fn test_ctrl_wheel_zooms() {
        let mut interaction = WaveformInteraction::default();
        let ctrl = Event::Keyboard(keyboard::Event::ModifiersChanged(keyboard::Modifiers::CTRL));
        assert_eq!(translate_event(&mut interaction, &ctrl, None, false), None);

        assert_eq!(
            translate_event(&mut interaction, &wheel(0.0, 1.0), Some(Point::new(70.0, 3.0)), true),
            Some(WaveformAction::Zoom {
                x: 70.0,
                direction: ZoomDirection::In
            })
        );
        assert_eq!(
            translate_event(&mut interaction, &wheel(0.0, -1.0), Some(Point::new(70.0, 3.0)), true),
            Some(WaveformAction::Zoom {
                x: 70.0,
                direction: ZoomDirection::Out
            })
        );
    }

    #[test]
    fn test_horizontal_wheel_scrolls() {
        let mut interaction = WaveformInteraction::default();
        assert_eq!(
            translate_event(&mut interaction, &wheel(-1.0, 0.0), Some(Point::new(1.0, 1.0)), true),
            Some(WaveformAction::Scroll {
                dx: SCROLL_PIXELS_PER_LINE
            })
        );
        assert_eq!(
            translate_event(&mut interaction, &wheel(0.0, 1.0), Some(Point::new(1.0, 1.0)), true),
            None
        );
    }
}
