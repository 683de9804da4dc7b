//! View functions returning iced elements

use iced::widget::canvas::Cache;
use iced::widget::Canvas;
use iced::{Element, Length};

use crate::theme::WaveformStyle;
use crate::viewport::ViewportState;
use crate::waveform::{WaveformCanvas, WaveformEvent, WaveformImage, WAVEFORM_HEIGHT};

/// Create the waveform editor element
///
/// # Arguments
///
/// * `image` - Envelope columns built from the shared sample
/// * `cache` - Geometry cache; clear it whenever `image` changes
/// * `viewport` - Zoom and scroll state, used to detect resizes
/// * `on_event` - Called with every pointer, wheel or resize gesture
pub fn waveform_editor<'a, Message>(
    image: &'a WaveformImage,
    cache: &'a Cache,
    viewport: ViewportState,
    on_event: impl Fn(WaveformEvent) -> Message + 'a,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    Canvas::new(WaveformCanvas {
        image,
        cache,
        viewport,
        style: WaveformStyle::default(),
        on_event,
    })
    .width(Length::Fill)
    .height(Length::Fixed(WAVEFORM_HEIGHT))
    .into()
}
